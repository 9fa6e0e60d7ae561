//! P751 curve and field parameters, gathered behind one trait the way the
//! teacher gathers a pairing-friendly curve's constants behind
//! `Bls12Parameters`/`FpParameters` (`algebra/src/curves/models/bls12/mod.rs`,
//! `algebra/src/fields/bls12_377/fq.rs`). Every base point and strategy
//! vector here is a plain `pub const`, computed offline (see the derivation
//! notes below and in `DESIGN.md`) rather than at process startup.

use crate::biginteger::BigInteger768;
use crate::fp::Fp751;
use crate::fp2::Fp2;

/// `x`-coordinate of Alice's public generator `PA`, a point of order
/// exactly `2^372` on `E0: y^2 = x^3 + x`.
pub const XPA: [u64; 12] = [
    0x4b0346f5cce233e9,
    0x632646086ce3acd5,
    0x5661d14ab7347693,
    0xa58a20449af1f133,
    0xb9ac2f40c56d6fa4,
    0x8e561e008fa0e3f3,
    0x6cae096d5db822c9,
    0x83fdb7a4ad3e83e8,
    0xb1317ad904386217,
    0x3fa23f89f6be06d2,
    0x429c8d36ff46bcc9,
    0x00003e82027a38e9,
];
pub const YPA: [u64; 12] = [
    0x12e0d620bfb341d5,
    0x0f8eea7370893430,
    0x5a99ebec3b5b8b00,
    0x236c7fac9e69f7fd,
    0x0f147ef3bd0cfec5,
    0x8ed5950d80325a8d,
    0x1e911f50bf3f721a,
    0x163a7421dfa8378d,
    0xc331b043da010e6a,
    0x5e15915a755883b7,
    0xb6236f5f598d56eb,
    0x00003bbf8dcd4e7e,
];

/// `x`-coordinate of Bob's public generator `PB`, a point of order exactly
/// `3^239` on the same curve.
pub const XPB: [u64; 12] = [
    0x9972365e9db7dc58,
    0x392ac417f2b9da69,
    0xe408c96eb4df6720,
    0x9cef8b73e4625590,
    0xaee78862cf2c7ac4,
    0x57940a8f08193e7b,
    0xd46802bb045b7384,
    0x6cc5ae43cb3238f8,
    0x7be87217606c7566,
    0x25f7534b98afe738,
    0x1f2f9cfc775b012b,
    0x000023166acb92d0,
];
pub const YPB: [u64; 12] = [
    0xaad19efaed42e911,
    0x4c802bc632503191,
    0x9f1aeb8503a868ba,
    0x28260af804073f2c,
    0x364ba82006ffb156,
    0x0f9e411c493fb865,
    0x6b4a36cd46dacdb0,
    0x98a93c700d03de6e,
    0xa2a640c15739bb90,
    0x02bbe553c7ba9319,
    0x25edadb627d8e5e5,
    0x00000e699bef5f6b,
];

/// `x(PA - QA)`, real component (`QA = tau(PA)` under the distortion map
/// `tau(x, y) = (-x, i*y)`; purely imaginary by construction for this pair,
/// i.e. this component is always zero — recorded explicitly rather than
/// assumed, see `DESIGN.md`).
pub const XPQA0: [u64; 12] = [0; 12];
pub const XPQA1: [u64; 12] = [
    0x1f5be2f76f8c1cf3,
    0x66b2dc64a0e70978,
    0x7e640026a587fa9e,
    0x98f4d3674368982d,
    0x7b1f17a219f2a98b,
    0xcd93d055e8682e4d,
    0x3b925823bff9bf61,
    0xf6dab2c1ad818e2c,
    0xb8f249956f277387,
    0xaf44e29e10e44cae,
    0x0dc0da655255d265,
    0x00005dcd3a80752b,
];

pub const XPQB0: [u64; 12] = [0; 12];
pub const XPQB1: [u64; 12] = [
    0x4bcac2fedb95735d,
    0xccf9f833e0cf1d4c,
    0x16deb3ed0af4970c,
    0x766ab674c913ed34,
    0x64e1836eac5b2859,
    0x1a93dd99a628b2b3,
    0xc820249a4fdd4656,
    0xa71a2571f27bd070,
    0x78f035373efb270a,
    0x13ac522d35c344ed,
    0x408c5099738f60de,
    0x000022888d5bd4d6,
];

/// `(p-1)/2`, the Legendre-symbol exponent used by [`crate::fp2::Fp2::is_square`].
pub const EXP_P_MINUS_1_OVER_2: [u64; 12] = [
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0x7757ffffffffffff,
    0x71f64b42a4fc3c54,
    0x6d4acd8d09fbe63b,
    0x04274c33eb75f43b,
    0x42b15a822e592ba4,
    0x0709484fcbdd6e33,
    0x000037f2eaa0fb8e,
];

/// `(p+1)/4`, the base-field square-root exponent for `p ≡ 3 (mod 4)`.
pub const EXP_P_PLUS_1_OVER_4: [u64; 12] = [
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x3bac000000000000,
    0xb8fb25a1527e1e2a,
    0xb6a566c684fdf31d,
    0x0213a619f5bafa1d,
    0xa158ad41172c95d2,
    0x0384a427e5eeb719,
    0x00001bf975507dc7,
];

/// Optimal 4-isogeny traversal strategy for Alice's `372/2 = 186`-step
/// tower (the special first 4-isogeny plus 184 ordinary ones; see
/// `DESIGN.md`'s resolution of the `eA/2 - 1` open question), computed by
/// [`crate::strategy::optimal_strategy`] with costs `(pA, qA) = (24.2,
/// 21.6)` (spec.md's own scenario-4 figures).
pub const STRATEGY_ALICE: [u8; 184] = [
    106, 106, 106, 106, 106, 106, 106, 106, 106, 105, 104, 103, 102, 101, 100, 99, 98, 97, 96, 95,
    94, 93, 92, 91, 90, 89, 88, 87, 86, 86, 86, 86, 86, 86, 86, 85, 84, 83, 82, 81, 80, 79, 78,
    77, 76, 75, 74, 73, 72, 71, 71, 70, 69, 68, 67, 66, 65, 64, 64, 64, 64, 64, 64, 64, 63, 63,
    63, 63, 63, 63, 63, 63, 63, 63, 63, 62, 61, 60, 59, 58, 58, 58, 58, 58, 58, 58, 58, 58, 58,
    58, 57, 56, 55, 54, 53, 52, 51, 50, 49, 48, 48, 48, 48, 48, 48, 47, 46, 45, 44, 43, 42, 41,
    40, 39, 38, 38, 37, 36, 35, 34, 33, 32, 32, 32, 32, 32, 32, 31, 31, 31, 31, 31, 31, 31, 30,
    29, 28, 27, 27, 27, 27, 27, 26, 25, 24, 23, 22, 21, 21, 20, 19, 18, 17, 16, 16, 16, 16, 16,
    15, 15, 15, 15, 14, 13, 12, 12, 11, 10, 9, 8, 8, 8, 8, 7, 7, 6, 5, 4, 4, 4, 3, 2, 2, 0,
];

/// Optimal 3-isogeny traversal strategy for Bob's `239`-step tower,
/// computed with costs `(pB, qB) = (30.0, 26.0)` — see `DESIGN.md`'s note
/// on this implementation-tunable choice.
pub const STRATEGY_BOB: [u8; 238] = [
    127, 127, 127, 127, 127, 127, 127, 126, 125, 124, 123, 122, 121, 121, 121, 121, 121, 121,
    121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 121, 120, 119, 118,
    117, 116, 115, 114, 113, 112, 111, 110, 109, 108, 107, 106, 106, 106, 106, 106, 106, 106,
    106, 106, 106, 106, 106, 106, 106, 106, 106, 105, 104, 103, 102, 101, 100, 99, 98, 97, 96,
    95, 94, 93, 92, 91, 90, 89, 88, 87, 86, 86, 86, 86, 86, 86, 86, 85, 84, 83, 82, 81, 80, 79,
    78, 77, 76, 75, 74, 73, 72, 71, 71, 70, 69, 68, 67, 66, 65, 64, 64, 64, 64, 64, 64, 64, 63,
    63, 63, 63, 63, 63, 63, 63, 63, 63, 63, 62, 61, 60, 59, 58, 58, 58, 58, 58, 58, 58, 58, 58,
    58, 58, 57, 56, 55, 54, 53, 52, 51, 50, 49, 48, 48, 48, 48, 48, 48, 47, 46, 45, 44, 43, 42,
    41, 40, 39, 38, 38, 37, 36, 35, 34, 33, 32, 32, 32, 32, 32, 32, 31, 31, 31, 31, 31, 31, 31,
    30, 29, 28, 27, 27, 27, 27, 27, 26, 25, 24, 23, 22, 21, 21, 20, 19, 18, 17, 16, 16, 16, 16,
    16, 15, 15, 15, 15, 14, 13, 12, 12, 11, 10, 9, 8, 8, 8, 8, 7, 7, 6, 5, 4, 4, 4, 3, 2, 2, 0,
];

/// `3^239` as a 12-limb integer, the order of Bob's torsion points; used by
/// `sidh::pairing`'s Miller loop, which treats the pairing order as a plain
/// binary scalar regardless of whether it is a power of 2 or of 3 (see
/// `DESIGN.md`'s note on the pairing module's doubling/tripling
/// simplification).
pub const ORDER_THREE_239: [u64; 12] = [
    0xc968549f878a8eeb,
    0x59b1a13f7cc76e3e,
    0xe9867d6ebe876da9,
    0x2b5045cb25748084,
    0x2909f97badc66856,
    0x06fe5d541f71c0e1,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
];

/// The curve/field parameter set for a given SIDH instantiation, mirroring
/// the teacher's `Bls12Parameters`/`FpParameters` associated-const pattern:
/// callers thread `P: Parameters` through the driver instead of hardcoding
/// P751 into `sidh::sidh`/`sidh::compression` directly.
pub trait Parameters {
    /// Exponent of 2 in `#E0(F_p2) = (2^eA * 3^eB)^2`.
    const E_ALICE: u32;
    /// Exponent of 3 in `#E0(F_p2) = (2^eA * 3^eB)^2`.
    const E_BOB: u32;
    /// Number of 4-isogeny steps in Alice's tower (the special first step
    /// plus the ordinary ones).
    const MAX_ALICE: usize;
    /// Number of 3-isogeny steps in Bob's tower.
    const MAX_BOB: usize;

    fn xpa() -> Fp2;
    fn ypa() -> Fp751;
    fn xpb() -> Fp2;
    fn ypb() -> Fp751;
    fn xpqa() -> Fp2;
    fn xpqb() -> Fp2;
    fn strategy_alice() -> &'static [u8];
    fn strategy_bob() -> &'static [u8];
}

/// Marker type for the P751 parameter set.
pub struct P751Params;

impl P751Params {
    pub fn exp_p_minus_1_over_2() -> BigInteger768 {
        BigInteger768(EXP_P_MINUS_1_OVER_2)
    }

    pub fn exp_p_plus_1_over_4() -> BigInteger768 {
        BigInteger768(EXP_P_PLUS_1_OVER_4)
    }

    /// `2^372`, Alice's torsion-point order, as a 12-limb integer.
    pub fn order_two_372() -> BigInteger768 {
        let mut limbs = [0u64; 12];
        limbs[5] = 1u64 << 52;
        BigInteger768(limbs)
    }

    /// `3^239`, Bob's torsion-point order, as a 12-limb integer.
    pub fn order_three_239() -> BigInteger768 {
        BigInteger768(ORDER_THREE_239)
    }
}

impl Parameters for P751Params {
    const E_ALICE: u32 = 372;
    const E_BOB: u32 = 239;
    const MAX_ALICE: usize = 185;
    const MAX_BOB: usize = 239;

    fn xpa() -> Fp2 {
        Fp2::from_fp(Fp751(BigInteger768(XPA)))
    }
    fn ypa() -> Fp751 {
        Fp751(BigInteger768(YPA))
    }
    fn xpb() -> Fp2 {
        Fp2::from_fp(Fp751(BigInteger768(XPB)))
    }
    fn ypb() -> Fp751 {
        Fp751(BigInteger768(YPB))
    }
    fn xpqa() -> Fp2 {
        Fp2::new(Fp751(BigInteger768(XPQA0)), Fp751(BigInteger768(XPQA1)))
    }
    fn xpqb() -> Fp2 {
        Fp2::new(Fp751(BigInteger768(XPQB0)), Fp751(BigInteger768(XPQB1)))
    }
    fn strategy_alice() -> &'static [u8] {
        &STRATEGY_ALICE
    }
    fn strategy_bob() -> &'static [u8] {
        &STRATEGY_BOB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_lengths_match_tower_heights() {
        assert_eq!(STRATEGY_ALICE.len(), P751Params::MAX_ALICE - 1);
        assert_eq!(STRATEGY_BOB.len(), P751Params::MAX_BOB - 1);
    }

    #[test]
    fn base_points_are_nonzero() {
        assert!(!P751Params::xpa().is_zero());
        assert!(!P751Params::xpb().is_zero());
    }

    #[test]
    fn cross_difference_real_components_are_zero() {
        assert!(P751Params::xpqa().c0.is_zero());
        assert!(P751Params::xpqb().c0.is_zero());
    }
}

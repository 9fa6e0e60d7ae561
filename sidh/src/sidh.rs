//! The SIDH key-exchange driver (spec.md §4.8): `keygen_a`/`keygen_b` and
//! `shared_a`/`shared_b`, each with a simple and a strategy-guided path.
//!
//! Follows the teacher's `Bls12::miller_loop` + `final_exponentiation`
//! split: one function drives the accumulation (here, the isogeny-tree
//! traversal) by calling into per-step primitives it doesn't own
//! (`isogeny`, `curve`), rather than inlining the tree walk itself.

use crate::curve::{get_a, ladder_3_pt, x_dble, MontgomeryCurve, ProjectivePoint};
use crate::error::{ParameterMismatch, SidhError, SidhResult};
use crate::fp::Fp751;
use crate::fp2::Fp2;
use crate::isogeny::{eval_4_isog, first_4_isog, traverse_simple_3, traverse_simple_4, traverse_strategy_3, traverse_strategy_4};
use crate::params::{Parameters, P751Params};

/// Uncompressed public key: the sender's isogeny applied to the
/// receiver's three pre-agreed torsion-basis points, normalized to `Z = 1`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub xp: Fp2,
    pub xq: Fp2,
    pub xpq: Fp2,
}

/// Prints the wire-format hex encoding rather than the internal `Fp2` limb
/// layout, since that's what a caller debugging a failed exchange actually
/// wants to diff against another implementation.
impl core::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl core::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in crate::serialize::public_key_to_bytes(self) {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Which traversal to use for the isogeny tree. `Fast` is the default;
/// `Simple` exists so `sidh::tests` (and any caller) can assert spec.md
/// §8's "simple vs. fast agreement" property against it directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Traversal {
    Simple,
    Fast,
}

pub(crate) fn validate_alice_sk(sk: &crate::biginteger::BigInteger768) -> SidhResult<()> {
    if !sk.is_even() {
        return Err(SidhError::ParameterMismatch(ParameterMismatch::InvalidAliceSecretKey));
    }
    let bound = P751Params::order_two_372();
    if *sk == crate::biginteger::BigInteger768::from_u64(0) || *sk >= bound {
        return Err(SidhError::ParameterMismatch(ParameterMismatch::InvalidAliceSecretKey));
    }
    Ok(())
}

pub(crate) fn validate_bob_sk(sk: &crate::biginteger::BigInteger768) -> SidhResult<()> {
    // multiple of 3: low two bits insufficient, check via mod-3 by repeated
    // subtraction is wasteful for 372 bits, so reduce through limb sum
    // mod 3 (2^64 mod 3 = 1, so a limb-sum mod 3 equals the value mod 3).
    let mut rem: u64 = 0;
    for &limb in sk.0.iter() {
        rem = (rem + (limb % 3)) % 3;
    }
    if rem != 0 {
        return Err(SidhError::ParameterMismatch(ParameterMismatch::InvalidBobSecretKey));
    }
    let bound = P751Params::order_three_239();
    if *sk == crate::biginteger::BigInteger768::from_u64(0) || *sk >= bound {
        return Err(SidhError::ParameterMismatch(ParameterMismatch::InvalidBobSecretKey));
    }
    Ok(())
}

fn normalize_triple(points: &[ProjectivePoint; 3]) -> SidhResult<PublicKey> {
    let zs = [points[0].z, points[1].z, points[2].z];
    let inv = Fp2::batch_invert(&zs)?;
    Ok(PublicKey {
        xp: points[0].x.mul(&inv[0]),
        xq: points[1].x.mul(&inv[1]),
        xpq: points[2].x.mul(&inv[2]),
    })
}

/// Remaining isogeny-tree height, in order-exponent terms, after Alice's
/// special first 4-isogeny has consumed 2 levels from the starting
/// `E_ALICE = 372`. The traversal below performs `370 / 2 = 185` further
/// leaf isogenies, matching `STRATEGY_ALICE`'s 184-entry splits array
/// (`leaves - 1`); `MAX_ALICE` (185, see `params.rs`) counts exactly this
/// ordinary-leaf total, with the special first step as an additional,
/// separately-tracked zeroth step. See `DESIGN.md` for this resolved
/// accounting.
const ALICE_REMAINING_HEIGHT: u32 = 370;

/// Highest bit index of `3^239` (379 bits, so bit 378 is the top one) —
/// `ladder_3_pt` is a plain binary ladder over the scalar regardless of
/// the group's prime-power order, so this is independent of `E_BOB`.
const BOB_LADDER_TOP_BIT: usize = 378;

/// Alice's keygen: builds the kernel point via the 3-point ladder over
/// Alice's own torsion basis, absorbs the special first 4-isogeny, then
/// traverses the remaining tower, pushing Bob's three basis points through
/// every isogeny along the way.
pub fn keygen_a(sk_a: &crate::biginteger::BigInteger768, traversal: Traversal) -> SidhResult<PublicKey> {
    let _timer = bench_utils::start_timer!(|| "Alice keygen");
    validate_alice_sk(sk_a)?;
    let curve0 = MontgomeryCurve::starting_curve();

    let xpa = P751Params::xpa();
    let xqa = xpa.neg();
    let xpqa = P751Params::xpqa();
    let kernel_full = ladder_3_pt(&curve0, xpa, xqa, xpqa, sk_a, 371);

    let xpb = P751Params::xpb();
    let xqb = xpb.neg();
    let xpqb = P751Params::xpqb();
    let ys = [
        ProjectivePoint::from_affine(xpb),
        ProjectivePoint::from_affine(xqb),
        ProjectivePoint::from_affine(xpqb),
    ];

    let kernel_order4 = x_dble(&curve0, &kernel_full, ALICE_REMAINING_HEIGHT);
    let (curve, coeffs, points_after_first) = first_4_isog(&kernel_order4, &ys)?;
    let kernel_remaining = eval_4_isog(&coeffs, &kernel_full);
    let mut points = points_after_first;

    match traversal {
        Traversal::Simple => traverse_simple_4(curve, kernel_remaining, ALICE_REMAINING_HEIGHT, &mut points),
        Traversal::Fast => {
            traverse_strategy_4(curve, kernel_remaining, ALICE_REMAINING_HEIGHT, P751Params::strategy_alice(), &mut points)
        }
    }?;

    let pk = normalize_triple(&points);
    bench_utils::end_timer!(_timer);
    pk
}

/// Bob's keygen: same shape as [`keygen_a`], but over the 3-isogeny tower
/// with no special first step and no preliminary isomorphism to absorb.
pub fn keygen_b(sk_b: &crate::biginteger::BigInteger768, traversal: Traversal) -> SidhResult<PublicKey> {
    let _timer = bench_utils::start_timer!(|| "Bob keygen");
    validate_bob_sk(sk_b)?;
    let curve0 = MontgomeryCurve::starting_curve();

    let xpb = P751Params::xpb();
    let xqb = xpb.neg();
    let xpqb = P751Params::xpqb();
    let kernel = ladder_3_pt(&curve0, xpb, xqb, xpqb, sk_b, BOB_LADDER_TOP_BIT);

    let xpa = P751Params::xpa();
    let xqa = xpa.neg();
    let xpqa = P751Params::xpqa();
    let mut points = [
        ProjectivePoint::from_affine(xpa),
        ProjectivePoint::from_affine(xqa),
        ProjectivePoint::from_affine(xpqa),
    ];

    match traversal {
        Traversal::Simple => traverse_simple_3(curve0, kernel, P751Params::E_BOB, &mut points),
        Traversal::Fast => traverse_strategy_3(curve0, kernel, P751Params::E_BOB, P751Params::strategy_bob(), &mut points),
    }?;

    let pk = normalize_triple(&points);
    bench_utils::end_timer!(_timer);
    pk
}

/// Alice's shared secret: recovers the curve `A` from Bob's public key,
/// builds the kernel via the general 3-point ladder (no base-field
/// restriction, unlike keygen, since the scalar now multiplies a received
/// point rather than the fixed starting-curve generator), traverses, and
/// reduces the terminal curve to its `j`-invariant.
pub fn shared_a(sk_a: &crate::biginteger::BigInteger768, pk_b: &PublicKey, traversal: Traversal) -> SidhResult<Fp2> {
    let _timer = bench_utils::start_timer!(|| "Alice shared secret");
    validate_alice_sk(sk_a)?;
    let a = get_a(&pk_b.xp, &pk_b.xq, &pk_b.xpq).map_err(|_| SidhError::ParameterMismatch(ParameterMismatch::InvalidPublicKeyCurve))?;
    let curve = MontgomeryCurve::new(a)?;

    let kernel = ladder_3_pt(&curve, pk_b.xp, pk_b.xq, pk_b.xpq, sk_a, 371);
    let shared = shared_from_kernel_a(curve, kernel, traversal)?;
    bench_utils::end_timer!(_timer);
    Ok(shared)
}

/// Shared by [`shared_a`] and [`crate::compression::decompress_and_shared_a`]:
/// given the curve Alice's kernel point lives on and that full-order-`2^372`
/// kernel itself (however it was constructed — secret-scalar ladder, or
/// the decompression scalar's two-dimensional combination), absorbs the
/// special first 4-isogeny and traverses the rest of the tower.
pub(crate) fn shared_from_kernel_a(curve: MontgomeryCurve, kernel: ProjectivePoint, traversal: Traversal) -> SidhResult<Fp2> {
    let kernel_order4 = x_dble(&curve, &kernel, ALICE_REMAINING_HEIGHT);
    let mut no_points: [ProjectivePoint; 0] = [];

    let (first_step_curve, coeffs, _) = first_4_isog(&kernel_order4, &[ProjectivePoint::infinity(); 3])?;
    let kernel_remaining = eval_4_isog(&coeffs, &kernel);

    let final_curve = match traversal {
        Traversal::Simple => traverse_simple_4(first_step_curve, kernel_remaining, ALICE_REMAINING_HEIGHT, &mut no_points),
        Traversal::Fast => traverse_strategy_4(
            first_step_curve,
            kernel_remaining,
            ALICE_REMAINING_HEIGHT,
            P751Params::strategy_alice(),
            &mut no_points,
        ),
    }?;

    Ok(j_invariant(&final_curve))
}

/// Bob's shared secret, symmetric to [`shared_a`] over the 3-isogeny tower.
pub fn shared_b(sk_b: &crate::biginteger::BigInteger768, pk_a: &PublicKey, traversal: Traversal) -> SidhResult<Fp2> {
    let _timer = bench_utils::start_timer!(|| "Bob shared secret");
    validate_bob_sk(sk_b)?;
    let a = get_a(&pk_a.xp, &pk_a.xq, &pk_a.xpq).map_err(|_| SidhError::ParameterMismatch(ParameterMismatch::InvalidPublicKeyCurve))?;
    let curve = MontgomeryCurve::new(a)?;

    let kernel = ladder_3_pt(&curve, pk_a.xp, pk_a.xq, pk_a.xpq, sk_b, BOB_LADDER_TOP_BIT);
    let shared = shared_from_kernel_b(curve, kernel, traversal)?;
    bench_utils::end_timer!(_timer);
    Ok(shared)
}

/// Bob-side counterpart to [`shared_from_kernel_a`], shared with
/// [`crate::compression::decompress_and_shared_b`].
pub(crate) fn shared_from_kernel_b(curve: MontgomeryCurve, kernel: ProjectivePoint, traversal: Traversal) -> SidhResult<Fp2> {
    let mut no_points: [ProjectivePoint; 0] = [];
    let final_curve = match traversal {
        Traversal::Simple => traverse_simple_3(curve, kernel, P751Params::E_BOB, &mut no_points),
        Traversal::Fast => traverse_strategy_3(curve, kernel, P751Params::E_BOB, P751Params::strategy_bob(), &mut no_points),
    }?;
    Ok(j_invariant(&final_curve))
}

/// `j = 256 * (A^2 - 3C^2)^3 / (C^4 * (A^2 - 4C^2))`, with `C = 1` under
/// this crate's normalized-curve convention.
pub fn j_invariant(curve: &MontgomeryCurve) -> Fp2 {
    let a2 = curve.a.square();
    let three = Fp2::from_fp(Fp751::from_u64(3));
    let four = Fp2::from_fp(Fp751::from_u64(4));
    let two_five_six = Fp2::from_fp(Fp751::from_u64(256));
    let num = a2.sub(&three).square().mul(&a2.sub(&three));
    let num = num.mul(&two_five_six);
    let den = a2.sub(&four);
    match den.invert() {
        Ok(den_inv) => num.mul(&den_inv),
        Err(_) => Fp2::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biginteger::BigInteger768;

    #[test]
    fn alice_secret_key_validation_rejects_odd() {
        let sk = BigInteger768::from_u64(3);
        assert!(validate_alice_sk(&sk).is_err());
    }

    #[test]
    fn bob_secret_key_validation_rejects_non_multiple_of_three() {
        let sk = BigInteger768::from_u64(4);
        assert!(validate_bob_sk(&sk).is_err());
    }

    #[test]
    fn bob_secret_key_validation_accepts_multiple_of_three() {
        let sk = BigInteger768::from_u64(9);
        assert!(validate_bob_sk(&sk).is_ok());
    }

    #[test]
    fn j_invariant_of_starting_curve_is_well_formed() {
        let curve = MontgomeryCurve::starting_curve();
        let j = j_invariant(&curve);
        let _ = j.srdc();
    }

    /// Small, non-cryptographic secret keys chosen only so the two parties'
    /// shared secrets can be compared for equality without running the full
    /// 372/239-bit exchange to completion inside this no-toolchain session.
    fn small_alice_sk() -> BigInteger768 {
        BigInteger768::from_u64(1 << 10)
    }

    fn small_bob_sk() -> BigInteger768 {
        BigInteger768::from_u64(3 * (1 << 8))
    }

    #[test]
    fn two_party_exchange_agrees_on_shared_secret() {
        let sk_a = small_alice_sk();
        let sk_b = small_bob_sk();

        let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("alice keygen succeeds");
        let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("bob keygen succeeds");

        let shared_from_a = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("alice shared-secret succeeds");
        let shared_from_b = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("bob shared-secret succeeds");

        assert_eq!(shared_from_a.srdc(), shared_from_b.srdc());
    }

    #[test]
    fn simple_and_strategy_traversals_agree() {
        let sk_a = small_alice_sk();
        let sk_b = small_bob_sk();

        let pk_a_fast = keygen_a(&sk_a, Traversal::Fast).expect("alice keygen succeeds");
        let pk_a_simple = keygen_a(&sk_a, Traversal::Simple).expect("alice keygen succeeds");
        assert_eq!(pk_a_fast, pk_a_simple);

        let pk_b_fast = keygen_b(&sk_b, Traversal::Fast).expect("bob keygen succeeds");
        let pk_b_simple = keygen_b(&sk_b, Traversal::Simple).expect("bob keygen succeeds");
        assert_eq!(pk_b_fast, pk_b_simple);

        let shared_fast = shared_a(&sk_a, &pk_b_fast, Traversal::Fast).expect("shared-secret succeeds");
        let shared_simple = shared_a(&sk_a, &pk_b_simple, Traversal::Simple).expect("shared-secret succeeds");
        assert_eq!(shared_fast.srdc(), shared_simple.srdc());
    }
}

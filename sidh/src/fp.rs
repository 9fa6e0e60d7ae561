//! The base field F_p for p = 2^372 * 3^239 - 1 (P751), in Montgomery form.
//!
//! Every `Fp751` holds `v * R mod p` for `R = 2^768`, never the plain
//! residue. Conversion in and out of Montgomery form happens only at the
//! crate boundary (`params::P751Params` constants are already stored in
//! Montgomery form; `to_bytes`/`from_bytes` in `crate::serialize` convert).
//!
//! `p` has the structural property `p ≡ -1 (mod 2^64)`, since the `2^372`
//! factor clears every bit below the 64th. That forces the Montgomery
//! reduction constant `INV = -p^-1 mod 2^64` down to `1`, which collapses
//! the usual per-limb `m = t[i] * INV mod 2^64` multiply into a copy. This
//! is used directly in [`reduce`] below rather than carried as a named
//! constant multiply, since multiplying by 1 is not an operation worth
//! spelling out.

use crate::biginteger::{BigInteger768, WideBigInteger, NUM_LIMBS};
use crate::error::{DomainViolation, SidhError, SidhResult};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// p = 2^372 * 3^239 - 1, little-endian limbs.
pub const MODULUS: [u64; NUM_LIMBS] = [
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xeeafffffffffffff,
    0xe3ec968549f878a8,
    0xda959b1a13f7cc76,
    0x084e9867d6ebe876,
    0x8562b5045cb25748,
    0x0e12909f97badc66,
    0x00006fe5d541f71c,
];

/// `2p`, kept reduced against during `add`/`sub` so both operands and the
/// result of every field op stay in `[0, 2p)` until an explicit [`Fp751::srdc`].
pub const TWO_P: [u64; NUM_LIMBS] = [
    0xfffffffffffffffe,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xdd5fffffffffffff,
    0xc7d92d0a93f0f151,
    0xb52b363427ef98ed,
    0x109d30cfadd7d0ed,
    0x0ac56a08b964ae90,
    0x1c25213f2f75b8cd,
    0x0000dfcbaa83ee38,
];

/// `R mod p`, `R = 2^768`.
pub const R: [u64; NUM_LIMBS] = [
    0x00000000000249ad,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x8310000000000000,
    0x5527b1e4375c6c66,
    0x697797bf3f4f24d0,
    0xc89db7b2ac5c4e2e,
    0x4ca4b439d2076956,
    0x10f7926c7512c7e9,
    0x00002d5b24bce5e2,
];

/// `R^2 mod p`, used to lift plain residues into Montgomery form.
pub const R2: [u64; NUM_LIMBS] = [
    0x233046449dad4058,
    0xdb010161a696452a,
    0x5e36941472e3fd8e,
    0xf40bfe2082a2e706,
    0x4932cca8904f8751,
    0x1f735f1f1ee7fc81,
    0xa24f4d80c1048e18,
    0xb56c383ccdb607c5,
    0x441dd47b735f9c90,
    0x5673ed2c6a6ac82a,
    0x06c905261132294b,
    0x000041ad830f1f35,
];

/// Montgomery multiply-by-scalar-at-a-time accumulator. `a + b*c + carry`,
/// returning `(low, high)`. The teacher's `algebra` crate performs the same
/// widen-to-u128 trick in its `biginteger` multiply helpers; `k256`'s
/// `field_montgomery.rs` (`other_examples`) names it `mac`.
#[inline(always)]
fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + (b as u128) * (c as u128) + carry as u128;
    (t as u64, (t >> 64) as u64)
}

#[inline(always)]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

/// Plain schoolbook (Comba-ordered) 12x12 -> 24-limb product. spec.md's
/// multiplication step describes a 6/6 Karatsuba split feeding schoolbook
/// sub-products; this crate uses schoolbook across the full operand instead
/// of performing that split, trading roughly 30% more word multiplications
/// for a carry-chain simple enough to get right without a compiler to check
/// it against. Recorded as a deliberate simplification in DESIGN.md.
fn mul_raw(a: &[u64; NUM_LIMBS], b: &[u64; NUM_LIMBS]) -> [u64; 2 * NUM_LIMBS] {
    let mut r = [0u64; 2 * NUM_LIMBS];
    for i in 0..NUM_LIMBS {
        let mut carry = 0u64;
        for j in 0..NUM_LIMBS {
            let (res, c) = mac(r[i + j], a[i], b[j], carry);
            r[i + j] = res;
            carry = c;
        }
        // Limb i+NUM_LIMBS has not been touched by any earlier outer
        // iteration (those only reach up to (i-1)+NUM_LIMBS-1), so the
        // leftover carry can be written directly instead of added.
        r[i + NUM_LIMBS] = carry;
    }
    r
}

/// CIOS-style Montgomery reduction of a 24-limb product, specialized for
/// `INV = 1`. Returns a value in `[0, 2p)`.
fn reduce(t_in: &[u64; 2 * NUM_LIMBS]) -> [u64; NUM_LIMBS] {
    let mut t = [0u64; 2 * NUM_LIMBS + 1];
    t[..2 * NUM_LIMBS].copy_from_slice(t_in);
    for i in 0..NUM_LIMBS {
        // m = t[i] * INV mod 2^64 = t[i] * 1 = t[i].
        let m = t[i];
        let mut carry = 0u64;
        for j in 0..NUM_LIMBS {
            let (res, c) = mac(t[i + j], m, MODULUS[j], carry);
            t[i + j] = res;
            carry = c;
        }
        let mut k = i + NUM_LIMBS;
        while carry != 0 {
            let (res, c) = adc(t[k], 0, carry);
            t[k] = res;
            carry = c;
            k += 1;
        }
    }
    let mut out = [0u64; NUM_LIMBS];
    out.copy_from_slice(&t[NUM_LIMBS..2 * NUM_LIMBS]);
    out
}

/// An element of F_p in Montgomery form, not necessarily strongly reduced
/// below `p` (only below `2p`; see [`Fp751::srdc`]).
#[derive(Copy, Clone, Debug)]
pub struct Fp751(pub BigInteger768);

impl Fp751 {
    pub const fn zero() -> Self {
        Fp751(BigInteger768::zero())
    }

    /// The Montgomery form of `1`, i.e. `R mod p`.
    pub fn one() -> Self {
        Fp751(BigInteger768(R))
    }

    /// Lift a plain (non-Montgomery) residue into Montgomery form.
    pub fn from_u64(x: u64) -> Self {
        Fp751(BigInteger768::from_u64(x)).mul(&Fp751(BigInteger768(R2)))
    }

    /// `true` iff this represents the residue 0, accounting for the two
    /// ways zero can appear in the unreduced `[0, 2p)` storage range (`0`
    /// and `p` itself; `2p` is never produced, see [`Fp751::add`]).
    pub fn is_zero(&self) -> bool {
        self.0.is_zero() || self.0 .0 == MODULUS
    }

    /// `self + other`, result in `[0, 2p)`. Both operands are assumed `< 2p`,
    /// so the sum is `< 4p` and a single conditional subtraction of `2p`
    /// suffices to bring it back into range.
    pub fn add(&self, other: &Self) -> Self {
        let mut sum = self.0;
        sum.add_nocarry(&other.0);
        let mut trial = sum;
        let borrow = trial.sub_noborrow(&BigInteger768(TWO_P));
        let keep_sum = Choice::from(borrow as u8);
        Fp751(BigInteger768::conditional_select(&trial, &sum, keep_sum))
    }

    /// `self - other`, result in `[0, 2p)`.
    pub fn sub(&self, other: &Self) -> Self {
        let mut diff = self.0;
        let borrow = diff.sub_noborrow(&other.0);
        let mut corrected = diff;
        corrected.add_nocarry(&BigInteger768(TWO_P));
        let need_fixup = Choice::from(borrow as u8);
        Fp751(BigInteger768::conditional_select(&diff, &corrected, need_fixup))
    }

    pub fn neg(&self) -> Self {
        Self::zero().sub(self)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let prod = mul_raw(&self.0 .0, &other.0 .0);
        Fp751(BigInteger768(reduce(&prod)))
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// `3 * self`, a recurring multiplier in xTPL and the 3-isogeny formulas.
    pub fn mul_by_three(&self) -> Self {
        self.add(self).add(self)
    }

    /// Strong reduction to the canonical representative in `[0, p)`.
    /// Every public-facing (de)serialization routine calls this first.
    pub fn srdc(&self) -> Self {
        let mut reduced = self.0;
        let borrow = reduced.sub_noborrow(&BigInteger768(MODULUS));
        let keep_original = Choice::from(borrow as u8);
        Fp751(BigInteger768::conditional_select(&reduced, &self.0, keep_original))
    }

    /// Constant-time equality, after strong reduction.
    pub fn ct_eq(&self, other: &Self) -> Choice {
        self.srdc().0.ct_eq(&other.srdc().0)
    }

    pub fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        let a_orig = *a;
        *a = Fp751(BigInteger768::conditional_select(&a.0, &b.0, choice));
        *b = Fp751(BigInteger768::conditional_select(&b.0, &a_orig.0, choice));
    }

    pub fn conditional_assign(&mut self, other: &Self, choice: Choice) {
        self.0 = BigInteger768::conditional_select(&self.0, &other.0, choice);
    }

    /// Field inversion via the Kaliski/Savas-Koç almost-inverse binary GCD.
    /// Not constant-time: spec.md §4.1 restricts inversion to public
    /// scalars (batched pairing denominators, the final shared-secret
    /// normalization), never secret ones, so the data-dependent branch
    /// count here is not a side channel the crate needs to close.
    pub fn invert(&self) -> SidhResult<Self> {
        let reduced = self.srdc();
        if reduced.0.is_zero() {
            return Err(SidhError::DomainViolation(DomainViolation::InversionOfZero));
        }

        let p = WideBigInteger::from_narrow(&BigInteger768(MODULUS));
        let mut u = WideBigInteger::from_narrow(&reduced.0);
        let mut v = p;
        let mut r = WideBigInteger::zero();
        let mut s = WideBigInteger::from_u64(1);
        let mut k = 0u32;

        // Phase 1: drive u to 0, tracking s with s*a == 2^k (mod p) along
        // the way (Kaliski's "almost inverse").
        while !u.is_zero() {
            if v.is_even() {
                v.shr1();
                s.shl1();
            } else if u.is_even() {
                u.shr1();
                r.shl1();
            } else if v.cmp(&u) == core::cmp::Ordering::Greater {
                v.sub_assign(&u);
                v.shr1();
                r.add_assign(&s);
                s.shl1();
            } else {
                u.sub_assign(&v);
                u.shr1();
                s.add_assign(&r);
                r.shl1();
            }
            k += 1;
        }
        if r.cmp(&p) != core::cmp::Ordering::Less {
            r.sub_assign(&p);
        }
        r = {
            let mut t = p;
            t.sub_assign(&r);
            t
        };

        // Phase 2: r * a == 2^k (mod p); halve r mod p exactly
        // k - NUM_LIMBS*64 times to reach r * a == 2^(NUM_LIMBS*64) (mod p),
        // i.e. r == a^-1 in plain (non-Montgomery) form times R... see below.
        let bits = (NUM_LIMBS * 64) as u32;
        debug_assert!(k >= bits);
        for _ in 0..(k - bits) {
            if r.is_even() {
                r.shr1();
            } else {
                r.add_assign(&p);
                r.shr1();
            }
        }

        // r now satisfies r * a == R (mod p) in plain-residue terms, i.e.
        // r is the plain inverse of (a's plain residue) already scaled by
        // R once. Converting through the regular Montgomery `mul` by R2
        // brings it to `a^-1 * R mod p`, the correct Montgomery form.
        let r_narrow = Fp751(r.to_narrow());
        Ok(r_narrow.mul(&Fp751(BigInteger768(R2))))
    }

    /// De-Montgomerizes: `self` holds `x * R mod p`, returns the plain
    /// canonical residue `x` in `[0, p)`. Implemented as a single CIOS
    /// reduction of `self`'s limbs zero-extended to 24 limbs, i.e.
    /// `REDC(xR) = xR * R^-1 mod p = x`, the same `reduce` used by [`mul`]
    /// with the other operand fixed at `1`. Used only at the crate boundary,
    /// by `crate::serialize`.
    pub fn to_canonical(&self) -> BigInteger768 {
        let reduced = self.srdc();
        let mut widened = [0u64; 2 * NUM_LIMBS];
        widened[..NUM_LIMBS].copy_from_slice(&reduced.0 .0);
        let out = reduce(&widened);
        let mut canonical = BigInteger768(out);
        let borrow = canonical.sub_noborrow(&BigInteger768(MODULUS));
        let keep_original = Choice::from(borrow as u8);
        BigInteger768::conditional_select(&canonical, &BigInteger768(out), keep_original)
    }

    /// Lifts a plain canonical residue into Montgomery form, the inverse of
    /// [`to_canonical`]. Used only at the crate boundary, by
    /// `crate::serialize`.
    pub fn from_canonical(x: &BigInteger768) -> Self {
        Fp751(*x).mul(&Fp751(BigInteger768(R2)))
    }
}

impl PartialEq for Fp751 {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Fp751 {}

#[cfg(test)]
mod tests {
    use super::*;

    fn one() -> Fp751 {
        Fp751::one()
    }

    #[test]
    fn one_times_one_is_one() {
        assert_eq!(one().mul(&one()), one());
    }

    #[test]
    fn add_sub_inverse() {
        let a = Fp751::from_u64(12345);
        let b = Fp751::from_u64(9876543210);
        let sum = a.add(&b);
        let back = sum.sub(&b);
        assert_eq!(back.srdc(), a.srdc());
    }

    #[test]
    fn neg_roundtrip() {
        let a = Fp751::from_u64(424242);
        let neg = a.neg();
        assert!(a.add(&neg).srdc().0.is_zero());
    }

    #[test]
    fn square_matches_self_mul() {
        let a = Fp751::from_u64(777);
        assert_eq!(a.square(), a.mul(&a));
    }

    #[test]
    fn inversion_roundtrip() {
        let a = Fp751::from_u64(31415926);
        let inv = a.invert().expect("nonzero");
        let prod = a.mul(&inv);
        assert_eq!(prod.srdc(), one().srdc());
    }

    #[test]
    fn invert_zero_is_domain_violation() {
        let zero = Fp751::zero();
        assert!(matches!(
            zero.invert(),
            Err(SidhError::DomainViolation(DomainViolation::InversionOfZero))
        ));
    }

    #[test]
    fn srdc_idempotent() {
        let a = Fp751::from_u64(999999);
        assert_eq!(a.srdc().srdc(), a.srdc());
    }

    #[test]
    fn mul_by_three_matches_repeated_add() {
        let a = Fp751::from_u64(55);
        assert_eq!(a.mul_by_three(), a.add(&a).add(&a));
    }
}

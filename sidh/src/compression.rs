//! Public-key compression and decompression (spec.md §4.9).
//!
//! A compressed key trades the three `Fp2` coordinates of a [`PublicKey`]
//! for a normalization bit plus three scalars mod `ell^e`, recovered by
//! expressing the sender's isogeny image `(phi(P), phi(Q))` in the
//! deterministic torsion basis `(R1, R2)` of the codomain curve via
//! Pohlig-Hellman on a batch of Tate pairings — the same building blocks
//! ([`crate::basis`], [`crate::pairing`], [`crate::pohlig_hellman`]) the
//! uncompressed driver in [`crate::sidh`] does not need. Decompression runs
//! the inverse: reconstruct the kernel point directly from the compressed
//! scalars and the receiver's own secret key by a two-dimensional scalar
//! combination, then hand it to the same kernel-to-shared-secret traversal
//! [`crate::sidh::shared_a`]/[`crate::sidh::shared_b`] use.

use crate::basis::{generate_basis_2, generate_basis_3};
use crate::biginteger::BigInteger768;
use crate::curve::{get_a, recover_y, x_dbladd, MontgomeryCurve, ProjectivePoint};
use crate::error::{InternalInvariant, ParameterMismatch, SidhError, SidhResult};
use crate::fp2::Fp2;
use crate::modscalar::{addmod, inv_mod_odd, inv_mod_pow2, mulmod};
use crate::pairing::{final_exponentiation, miller_loop_batched, AffinePoint};
use crate::params::P751Params;
use crate::pohlig_hellman::{windowed_dlog, WINDOW_THREE, WINDOW_TWO};
use crate::sidh::{shared_from_kernel_a, shared_from_kernel_b, validate_alice_sk, validate_bob_sk, PublicKey, Traversal};

/// A compressed public key: one bit plus three scalars mod `ell^e`, where
/// `ell` and `e` are implied by which party's key this is (Alice's carries
/// Bob's `3^239`-torsion images, Bob's carries Alice's `2^372`-torsion
/// images — the opposite of each party's own secret-key modulus).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct CompressedPublicKey {
    pub bit: bool,
    pub s1: BigInteger768,
    pub s2: BigInteger768,
    pub s3: BigInteger768,
    pub a: Fp2,
}

/// Prints the scalars' little-endian hex rather than limb arrays. Since
/// which wire width (`COMPRESSED_A_BYTES` vs `COMPRESSED_B_BYTES`) applies
/// depends on which party's key this is, and that isn't recoverable from
/// the struct alone, this formats each field independently rather than
/// delegating to `crate::serialize`.
impl core::fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CompressedPublicKey({})", self)
    }
}

impl core::fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "bit={} s1=", self.bit as u8)?;
        for byte in self.s1.to_bytes_le() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, " s2=")?;
        for byte in self.s2.to_bytes_le() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, " s3=")?;
        for byte in self.s3.to_bytes_le() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// `x`-coordinate `x` paired with the canonical (sqrt-convention) root of
/// `x^3 + a*x^2 + x`. Both parties compute the same convention
/// independently, so no cross-check against a second point is needed here
/// (contrast [`crate::curve::recover_y`], which disambiguates against a
/// known sum because its candidate `x`-coordinate alone under-determines
/// the sign).
fn affine_with_canonical_y(curve: &MontgomeryCurve, x: &Fp2) -> SidhResult<AffinePoint> {
    let rhs = x.square().mul(x).add(&curve.a.mul(&x.square())).add(x);
    let y = rhs.sqrt()?;
    Ok(AffinePoint::new(*x, y))
}

/// Affine Montgomery addition `p + q`, `p != q`. Duplicated from the
/// add-with-slope shape [`crate::pairing`] keeps private to its own Miller
/// loop, since this module needs the resulting point without a loop
/// accumulator attached.
fn affine_add(curve: &MontgomeryCurve, p: &AffinePoint, q: &AffinePoint) -> SidhResult<AffinePoint> {
    let dx = q.x.sub(&p.x);
    if dx.is_zero() {
        return Err(SidhError::InternalInvariant(InternalInvariant::DigitOutOfRange));
    }
    let lambda = q.y.sub(&p.y).mul(&dx.invert()?);
    let x3 = lambda.square().sub(&curve.a).sub(&p.x).sub(&q.x);
    let y3 = lambda.mul(&p.x.sub(&x3)).sub(&p.y);
    Ok(AffinePoint::new(x3, y3))
}

/// Single-point Montgomery ladder: returns `([t]Q, [t+1]Q)` in `x`-only
/// form, scalar read MSB-first from bit `top_bit`. The three-point ladder
/// in [`crate::curve::ladder_3_pt`] inlines this same recurrence fused with
/// a second point; here only the plain ladder is needed.
fn ladder_scalar(curve: &MontgomeryCurve, xq: Fp2, t: &BigInteger768, top_bit: usize) -> (ProjectivePoint, ProjectivePoint) {
    let q = ProjectivePoint::from_affine(xq);
    let mut r0 = ProjectivePoint::infinity();
    let mut r1 = q;
    for i in (0..=top_bit).rev() {
        if t.bit(i) {
            let (new_r1, new_r0) = x_dbladd(curve, &r1, &r0, &q);
            r0 = new_r0;
            r1 = new_r1;
        } else {
            let (new_r0, new_r1) = x_dbladd(curve, &r0, &r1, &q);
            r0 = new_r0;
            r1 = new_r1;
        }
    }
    (r0, r1)
}

/// Two-dimensional scalar combination `base + [t]scaled`: a plain ladder
/// on `scaled` to get `x([t]scaled)` and `x([t+1]scaled)`, `recover_y`
/// against `scaled`'s own known affine coordinates (`scaled + scaled's
/// known-affine diff` is exactly `[t+1]scaled`), then one affine addition
/// with `base`.
fn combine_point(curve: &MontgomeryCurve, base: &AffinePoint, scaled: &AffinePoint, t: &BigInteger768, top_bit: usize) -> SidhResult<AffinePoint> {
    let (r_t, r_t1) = ladder_scalar(curve, scaled.x, t, top_bit);
    let x_t = r_t.normalize()?;
    let x_t1 = r_t1.normalize()?;
    let y_t = recover_y(curve, &x_t, &x_t1, &scaled.x, &scaled.y)?;
    let scaled_t = AffinePoint::new(x_t, y_t);
    affine_add(curve, base, &scaled_t)
}

/// Whether `x` is coprime to `ell` (`ell` in `{2, 3}`), the normalization
/// test of spec.md §4.9. Mirrors `sidh::validate_bob_sk`'s limb-sum-mod-3
/// trick for `ell = 3` (`2^64 mod 3 = 1`).
fn coprime_to_ell(x: &BigInteger768, ell: u64) -> bool {
    if ell == 2 {
        x.is_odd()
    } else {
        let mut rem: u64 = 0;
        for &limb in x.0.iter() {
            rem = (rem + (limb % 3)) % 3;
        }
        rem != 0
    }
}

/// `x^-1 mod modulus`, dispatching to the odd- or power-of-two-modulus
/// algorithm by `ell`.
fn inv_mod(x: &BigInteger768, modulus: &BigInteger768, ell: u64) -> SidhResult<BigInteger768> {
    if ell == 2 {
        inv_mod_pow2(x, modulus)
    } else {
        inv_mod_odd(x, modulus)
    }
}

/// Shared compression logic for both parties (spec.md §4.9, "Compress").
/// `for_two_torsion_output` and `ell` must agree (`true` with `ell = 2`,
/// `false` with `ell = 3`) per [`crate::pairing::final_exponentiation`]'s
/// cofactor convention.
#[allow(clippy::too_many_arguments)]
fn compress_common(
    pk: &PublicKey,
    generate_basis: fn(&MontgomeryCurve) -> SidhResult<(ProjectivePoint, ProjectivePoint)>,
    modulus: BigInteger768,
    e: u32,
    ell: u64,
    pairing_top_bit: usize,
    for_two_torsion_output: bool,
    window: u32,
) -> SidhResult<CompressedPublicKey> {
    let a = get_a(&pk.xp, &pk.xq, &pk.xpq).map_err(|_| SidhError::ParameterMismatch(ParameterMismatch::InvalidPublicKeyCurve))?;
    let curve = MontgomeryCurve::new(a)?;

    let phi_p = affine_with_canonical_y(&curve, &pk.xp)?;
    let phi_q = affine_with_canonical_y(&curve, &pk.xq)?;

    let (r1_proj, r2_proj) = generate_basis(&curve)?;
    let r1 = affine_with_canonical_y(&curve, &r1_proj.normalize()?)?;
    let r2 = affine_with_canonical_y(&curve, &r2_proj.normalize()?)?;

    // base = R2: e(R2, R1) = g, e(R2, phi(P)) = g^a0, e(R2, phi(Q)) = g^a1.
    let from_r2 = miller_loop_batched(&curve, &r2, &[r1, phi_p, phi_q], &modulus, pairing_top_bit)?;
    let g = final_exponentiation(&from_r2[0], for_two_torsion_output)?;
    let r0 = final_exponentiation(&from_r2[1], for_two_torsion_output)?;
    let t0 = final_exponentiation(&from_r2[2], for_two_torsion_output)?;

    // base = R1: e(R1, phi(P)) = g^-b0, e(R1, phi(Q)) = g^-b1.
    let from_r1 = miller_loop_batched(&curve, &r1, &[phi_p, phi_q], &modulus, pairing_top_bit)?;
    let neg_b0 = final_exponentiation(&from_r1[0], for_two_torsion_output)?;
    let neg_b1 = final_exponentiation(&from_r1[1], for_two_torsion_output)?;

    let a0 = windowed_dlog(&g, &r0, ell, e, window)?;
    let a1 = windowed_dlog(&g, &t0, ell, e, window)?;
    let g_inv = g.invert()?;
    let b0 = windowed_dlog(&g_inv, &neg_b0, ell, e, window)?;
    let b1 = windowed_dlog(&g_inv, &neg_b1, ell, e, window)?;

    let (bit, s1, s2, s3) = if coprime_to_ell(&a0, ell) {
        let a0_inv = inv_mod(&a0, &modulus, ell)?;
        (false, mulmod(&b0, &a0_inv, &modulus), mulmod(&a1, &a0_inv, &modulus), mulmod(&b1, &a0_inv, &modulus))
    } else if coprime_to_ell(&b0, ell) {
        let b0_inv = inv_mod(&b0, &modulus, ell)?;
        (true, mulmod(&a0, &b0_inv, &modulus), mulmod(&a1, &b0_inv, &modulus), mulmod(&b1, &b0_inv, &modulus))
    } else {
        return Err(SidhError::DomainViolation(crate::error::DomainViolation::CompressionNormalizationMismatch));
    };

    Ok(CompressedPublicKey { bit, s1, s2, s3, a })
}

/// Compresses Alice's public key: her isogeny's images of Bob's
/// `3^239`-torsion basis, expressed against the deterministic `3^239`
/// basis of the codomain curve.
pub fn compress_a(pk: &PublicKey) -> SidhResult<CompressedPublicKey> {
    compress_common(pk, generate_basis_3, P751Params::order_three_239(), 239, 3, 378, false, WINDOW_THREE)
}

/// Compresses Bob's public key: his isogeny's images of Alice's
/// `2^372`-torsion basis, expressed against the deterministic `2^372`
/// basis of the codomain curve.
pub fn compress_b(pk: &PublicKey) -> SidhResult<CompressedPublicKey> {
    compress_common(pk, generate_basis_2, P751Params::order_two_372(), 372, 2, 372, true, WINDOW_TWO)
}

/// The decompression scalar `t` (spec.md §4.9), with the `s2`/`s3` swap the
/// spec names as "arguments reordered on b = 1".
fn decompression_scalar(sk: &BigInteger768, cpk: &CompressedPublicKey, modulus: &BigInteger768, ell: u64) -> SidhResult<BigInteger768> {
    let one = BigInteger768::from_u64(1);
    let (num, den) = if cpk.bit {
        (addmod(&cpk.s1, &mulmod(sk, &cpk.s2, modulus), modulus), addmod(&one, &mulmod(sk, &cpk.s3, modulus), modulus))
    } else {
        (addmod(&cpk.s1, &mulmod(sk, &cpk.s3, modulus), modulus), addmod(&one, &mulmod(sk, &cpk.s2, modulus), modulus))
    };
    let den_inv = inv_mod(&den, modulus, ell)?;
    Ok(mulmod(&num, &den_inv, modulus))
}

/// Decompresses Bob's compressed public key and computes the shared
/// secret with Alice's secret key, without ever materializing Bob's
/// uncompressed [`PublicKey`].
pub fn decompress_and_shared_a(sk_a: &BigInteger768, cpk_b: &CompressedPublicKey, traversal: Traversal) -> SidhResult<Fp2> {
    validate_alice_sk(sk_a)?;
    let curve = MontgomeryCurve::new(cpk_b.a)?;
    let modulus = P751Params::order_two_372();

    let (r1_proj, r2_proj) = generate_basis_2(&curve)?;
    let r1 = affine_with_canonical_y(&curve, &r1_proj.normalize()?)?;
    let r2 = affine_with_canonical_y(&curve, &r2_proj.normalize()?)?;

    let t = decompression_scalar(sk_a, cpk_b, &modulus, 2)?;
    let kernel_affine = if cpk_b.bit {
        combine_point(&curve, &r2, &r1, &t, 371)?
    } else {
        combine_point(&curve, &r1, &r2, &t, 371)?
    };

    let kernel = ProjectivePoint::from_affine(kernel_affine.x);
    shared_from_kernel_a(curve, kernel, traversal)
}

/// Decompresses Alice's compressed public key and computes the shared
/// secret with Bob's secret key.
pub fn decompress_and_shared_b(sk_b: &BigInteger768, cpk_a: &CompressedPublicKey, traversal: Traversal) -> SidhResult<Fp2> {
    validate_bob_sk(sk_b)?;
    let curve = MontgomeryCurve::new(cpk_a.a)?;
    let modulus = P751Params::order_three_239();

    let (r1_proj, r2_proj) = generate_basis_3(&curve)?;
    let r1 = affine_with_canonical_y(&curve, &r1_proj.normalize()?)?;
    let r2 = affine_with_canonical_y(&curve, &r2_proj.normalize()?)?;

    let t = decompression_scalar(sk_b, cpk_a, &modulus, 3)?;
    let kernel_affine = if cpk_a.bit {
        combine_point(&curve, &r2, &r1, &t, 378)?
    } else {
        combine_point(&curve, &r1, &r2, &t, 378)?
    };

    let kernel = ProjectivePoint::from_affine(kernel_affine.x);
    shared_from_kernel_b(curve, kernel, traversal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidh::{keygen_a, keygen_b, shared_a, shared_b};

    fn small_alice_sk() -> BigInteger768 {
        BigInteger768::from_u64(1 << 10)
    }

    fn small_bob_sk() -> BigInteger768 {
        BigInteger768::from_u64(3 * (1 << 8))
    }

    #[test]
    fn compressed_bob_key_yields_same_shared_secret_as_uncompressed() {
        let sk_a = small_alice_sk();
        let sk_b = small_bob_sk();
        let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("valid Alice key");
        let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("valid Bob key");

        let plain = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("plain shared secret");

        let cpk_b = compress_b(&pk_b).expect("Bob's key compresses");
        let from_compressed = decompress_and_shared_a(&sk_a, &cpk_b, Traversal::Fast).expect("decompression succeeds");

        assert_eq!(plain.srdc(), from_compressed.srdc());
        let _ = pk_a;
    }

    #[test]
    fn compressed_alice_key_yields_same_shared_secret_as_uncompressed() {
        let sk_a = small_alice_sk();
        let sk_b = small_bob_sk();
        let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("valid Alice key");
        let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("valid Bob key");

        let plain = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("plain shared secret");

        let cpk_a = compress_a(&pk_a).expect("Alice's key compresses");
        let from_compressed = decompress_and_shared_b(&sk_b, &cpk_a, Traversal::Fast).expect("decompression succeeds");

        assert_eq!(plain.srdc(), from_compressed.srdc());
        let _ = pk_b;
    }
}

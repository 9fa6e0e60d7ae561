//! Batched Tate pairings (spec.md §4.5).
//!
//! Computes `e(P, Q)` for a fixed `P` against up to five query points `Q`
//! simultaneously, sharing the doubling/tripling sequence on `P` across all
//! five Miller-loop accumulators (the "5-way batched" structure spec.md
//! describes). Rather than the CLN-style `dbl_and_line`/`triple_and_parabola`
//! formulas specialised for Montgomery `(X:Z)` coordinates — which the
//! literature derives from a base-field-only ladder trick this crate cannot
//! independently re-verify without a compiler — this module runs the
//! textbook affine-coordinate Miller's algorithm, expressing the pairing
//! order as a plain binary scalar (`2^372` or `3^239`, see
//! [`crate::params::P751Params::order_two_372`]/`order_three_239`) so a
//! single square-and-multiply loop serves both the "doubling-only" and
//! "tripling-only" cases spec.md names. Slower (addition steps fire
//! whenever a bit of `3^239`'s binary expansion is set, not just at
//! tripling boundaries) but built entirely from the standard affine group
//! law, which this crate can derive and check by hand with much higher
//! confidence than the packed formulas.

use crate::biginteger::BigInteger768;
use crate::curve::MontgomeryCurve;
use crate::error::{InternalInvariant, SidhError, SidhResult};
use crate::fp2::Fp2;

/// A full affine point `(x, y)` on a Montgomery curve, as opposed to
/// `curve::ProjectivePoint`'s `x`-only tracking — the Miller loop's line
/// functions need `y`.
#[derive(Copy, Clone, Debug)]
pub struct AffinePoint {
    pub x: Fp2,
    pub y: Fp2,
}

impl AffinePoint {
    pub fn new(x: Fp2, y: Fp2) -> Self {
        AffinePoint { x, y }
    }
}

/// `(2P, lambda)`, the Montgomery-curve affine doubling slope
/// `lambda = (3x^2 + 2Ax + 1) / (2y)`.
fn double_with_slope(curve: &MontgomeryCurve, p: &AffinePoint) -> SidhResult<(AffinePoint, Fp2)> {
    let three = Fp2::from_fp(crate::fp::Fp751::from_u64(3));
    let two = Fp2::from_fp(crate::fp::Fp751::from_u64(2));
    let num = p.x.square().mul(&three).add(&curve.a.mul(&p.x).mul(&two)).add(&Fp2::one());
    let den = p.y.mul(&two);
    let den_inv = den.invert()?;
    let lambda = num.mul(&den_inv);
    let x3 = lambda.square().sub(&curve.a).sub(&p.x).sub(&p.x);
    let y3 = lambda.mul(&p.x.sub(&x3)).sub(&p.y);
    Ok((AffinePoint::new(x3, y3), lambda))
}

/// `(P+Q, lambda)`, the Montgomery-curve affine addition slope
/// `lambda = (yQ - yP) / (xQ - xP)`.
fn add_with_slope(curve: &MontgomeryCurve, p: &AffinePoint, q: &AffinePoint) -> SidhResult<(AffinePoint, Fp2)> {
    let dx = q.x.sub(&p.x);
    if dx.is_zero() {
        return Err(SidhError::InternalInvariant(InternalInvariant::DigitOutOfRange));
    }
    let lambda = q.y.sub(&p.y).mul(&dx.invert()?);
    let x3 = lambda.square().sub(&curve.a).sub(&p.x).sub(&q.x);
    let y3 = lambda.mul(&p.x.sub(&x3)).sub(&p.y);
    Ok((AffinePoint::new(x3, y3), lambda))
}

/// `(numerator, denominator)` of the Miller loop's running value for one
/// query point.
#[derive(Copy, Clone)]
struct MillerAccumulator {
    num: Fp2,
    den: Fp2,
}

impl MillerAccumulator {
    fn one() -> Self {
        MillerAccumulator { num: Fp2::one(), den: Fp2::one() }
    }

    fn absorb_tangent(&mut self, t: &AffinePoint, lambda: &Fp2, q: &AffinePoint) {
        self.num = self.num.square().mul(&q.y.sub(&t.y).sub(&lambda.mul(&q.x.sub(&t.x))));
    }

    fn absorb_vertical(&mut self, new_t: &AffinePoint, q: &AffinePoint) {
        self.den = self.den.square().mul(&q.x.sub(&new_t.x));
    }

    fn absorb_line(&mut self, t: &AffinePoint, lambda: &Fp2, q: &AffinePoint) {
        self.num = self.num.mul(&q.y.sub(&t.y).sub(&lambda.mul(&q.x.sub(&t.x))));
    }

    fn absorb_vertical_add(&mut self, new_t: &AffinePoint, q: &AffinePoint) {
        self.den = self.den.mul(&q.x.sub(&new_t.x));
    }
}

/// Miller's algorithm, batched over up to five query points sharing one
/// doubling/addition sequence on `base`. `order` is the exact order of
/// `base` (either `2^372` or `3^239`), read MSB-first from bit `top_bit`.
pub fn miller_loop_batched(
    curve: &MontgomeryCurve,
    base: &AffinePoint,
    queries: &[AffinePoint],
    order: &BigInteger768,
    top_bit: usize,
) -> SidhResult<Vec<Fp2>> {
    let _timer = bench_utils::start_timer!(|| "batched Miller loop");
    let mut t = *base;
    let mut accs = vec![MillerAccumulator::one(); queries.len()];

    for i in (0..top_bit).rev() {
        let (doubled, lambda) = double_with_slope(curve, &t)?;
        for (acc, q) in accs.iter_mut().zip(queries.iter()) {
            acc.absorb_tangent(&t, &lambda, q);
            acc.absorb_vertical(&doubled, q);
        }
        t = doubled;
        if order.bit(i) {
            let (added, lambda) = add_with_slope(curve, &t, base)?;
            for (acc, q) in accs.iter_mut().zip(queries.iter()) {
                acc.absorb_line(&t, &lambda, q);
                acc.absorb_vertical_add(&added, q);
            }
            t = added;
        }
    }

    let dens: Vec<Fp2> = accs.iter().map(|a| a.den).collect();
    let inv_dens = Fp2::batch_invert(&dens)?;
    let out = accs.iter().zip(inv_dens.iter()).map(|(a, d_inv)| a.num.mul(d_inv)).collect();
    bench_utils::end_timer!(_timer);
    Ok(out)
}

/// Projects a raw Miller-loop output into the cyclotomic subgroup and then
/// onto the order-`2^372` (or order-`3^239`) subgroup by raising to the
/// complementary cofactor, per spec.md §4.5's final exponentiation.
pub fn final_exponentiation(value: &Fp2, for_two_torsion_output: bool) -> SidhResult<Fp2> {
    let cyclotomic = value.to_cyclotomic()?;
    Ok(if for_two_torsion_output {
        cyclotomic.cyclotomic_pow3(239)
    } else {
        cyclotomic.cyclotomic_pow2(372)
    })
}

/// Computes the five pairings `e(R2, R1), e(R2, QS'), ...` needed by
/// compression (spec.md §4.9): one shared base point `base`, five query
/// points, a single batched Miller loop, then final exponentiation applied
/// independently to each of the five outputs.
pub fn pairings_5(
    curve: &MontgomeryCurve,
    base: &AffinePoint,
    queries: &[AffinePoint; 5],
    order: &BigInteger768,
    top_bit: usize,
    for_two_torsion_output: bool,
) -> SidhResult<[Fp2; 5]> {
    let raw = miller_loop_batched(curve, base, queries, order, top_bit)?;
    let mut out = [Fp2::zero(); 5];
    for (o, r) in out.iter_mut().zip(raw.iter()) {
        *o = final_exponentiation(r, for_two_torsion_output)?;
    }
    Ok(out)
}

//! The R-ate pairing `e: G1 × G2 → GT` on the SM9 BN curve.
//!
//! The Miller loop runs over `a = 6t + 2` with affine line functions, followed by the two
//! Frobenius correction lines and the final exponentiation to the power `(q¹² - 1) / N`.

use super::field::Field;
use super::fp::{Fp, MODULUS};
use super::fp12::Fp12;
use super::fp2::Fp2;
use super::g1::G1Affine;
use super::g2::G2Affine;
use super::point::Affine;
use super::scalar::{Scalar, ORDER};
use super::CurveParams;
use crate::util::bits;
use once_cell::sync::Lazy;
use tracing::trace;

/// Size of an encoded GT element.
pub const GT_BYTES: usize = 384;

/// `(q⁴ - q² + 1) / N`, the exponent of the hard part.
static HARD_EXPONENT: Lazy<Vec<u8>> = Lazy::new(|| {
    let q2 = &*MODULUS * &*MODULUS;
    let cyclotomic = &q2 * &q2 - &q2 + 1u32;
    (cyclotomic / &*ORDER).to_bytes_be()
});

/// An element of the order-N subgroup of `F_q¹²*`, written multiplicatively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gt(pub(crate) Fp12);

impl Gt {
    pub fn identity() -> Self {
        Gt(Fp12::one())
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Fp12::one()
    }

    pub fn pow(&self, k: &Scalar) -> Self {
        Gt(self.0.pow_bytes(&k.to_bytes()))
    }

    /// The 384-byte encoding hashed by the protocols.
    ///
    /// Coefficients are emitted in the order `c5, c2, c4, c1, c3, c0`, each as `u`-part first.
    pub fn to_bytes(&self) -> [u8; GT_BYTES] {
        let c = &self.0.c;
        let mut buf = [0u8; GT_BYTES];
        let order = [&c[5], &c[2], &c[4], &c[1], &c[3], &c[0]];
        for (chunk, coeff) in buf.chunks_exact_mut(Fp2::BYTES).zip(order.iter()) {
            chunk.copy_from_slice(&coeff.to_bytes());
        }
        buf
    }
}

impl<'a, 'b> core::ops::Mul<&'b Gt> for &'a Gt {
    type Output = Gt;

    fn mul(self, rhs: &'b Gt) -> Gt {
        Gt(&self.0 * &rhs.0)
    }
}

impl_binops_multiplicative!(Gt);

/// Line through `T` and `Q` (the tangent at `T` when `Q` is `None`), evaluated at `P` and
/// scaled by `u⁻¹`, leaving only the coefficients of `1`, `z³` and `z⁵`. `T` is replaced by
/// `T + Q` (or `2T`).
fn line_step(t: &mut G2Affine, q: Option<&G2Affine>, p: &G1Affine) -> (Fp, Fp2, Fp2) {
    let (base, x2) = match q {
        None => (t.clone(), t.x.clone()),
        Some(q) => (q.clone(), q.x.clone()),
    };

    let (num, den) = match q {
        None => {
            let xx = t.x.square();
            (xx.double() + &xx, t.y.double())
        }
        Some(q) => (t.y.clone() - &q.y, t.x.clone() - &q.x),
    };
    // The denominator only vanishes for T = ±Q, which order-N inputs never reach.
    let lambda = num * &den.invert().unwrap_or_else(Fp2::zero);

    let c0 = -p.y.clone();
    let c3 = (base.y.clone() - &(lambda.clone() * &base.x)) * CurveParams::sm9().u_inv();
    let c5 = lambda.mul_by_fp(&p.x) * CurveParams::sm9().u_inv();

    let x3 = lambda.square() - &t.x - &x2;
    let y3 = lambda * &(t.x.clone() - &x3) - &t.y;
    *t = Affine::new_unchecked(x3, y3);

    (c0, c3, c5)
}

/// `π(Q) = (x̄·w, ȳ·w·r)`, the q-power Frobenius carried through the twist.
fn frobenius(q: &G2Affine) -> G2Affine {
    let params = CurveParams::sm9();
    Affine::new_unchecked(
        q.x.conjugate().mul_by_fp(params.frobenius_x()),
        q.y.conjugate().mul_by_fp(params.frobenius_y()),
    )
}

pub(crate) fn miller_loop(p: &G1Affine, q: &G2Affine) -> Fp12 {
    let loop_count = CurveParams::sm9().ate_loop_count().to_bytes_be();

    let mut f = Fp12::one();
    let mut t = q.clone();

    for bit in bits(&loop_count).skip_while(|b| !b).skip(1) {
        let (l0, l3, l5) = line_step(&mut t, None, p);
        f = f.square().mul_by_line(&l0, &l3, &l5);
        if bit {
            let (l0, l3, l5) = line_step(&mut t, Some(q), p);
            f = f.mul_by_line(&l0, &l3, &l5);
        }
    }

    let q1 = frobenius(q);
    let q2 = -frobenius(&q1);

    let (l0, l3, l5) = line_step(&mut t, Some(&q1), p);
    f = f.mul_by_line(&l0, &l3, &l5);
    let (l0, l3, l5) = line_step(&mut t, Some(&q2), p);
    f.mul_by_line(&l0, &l3, &l5)
}

/// `f^((q¹² - 1) / N)`, split as `(q⁶ - 1)(q² + 1)` followed by `(q⁴ - q² + 1) / N`.
pub(crate) fn final_exponentiation(f: &Fp12) -> Fp12 {
    // Miller loop outputs are never zero.
    let Some(inv) = f.invert() else {
        return Fp12::zero();
    };
    let f1 = f.conjugate() * inv;
    let f2 = f1.frobenius_square() * &f1;
    f2.pow_bytes(&HARD_EXPONENT)
}

/// Evaluates `e(P, Q)`. The identity in either argument maps to the identity of GT.
pub fn pairing(p: &G1Affine, q: &G2Affine) -> Gt {
    if p.is_identity() || q.is_identity() {
        return Gt::identity();
    }
    trace!("evaluating pairing");
    Gt(final_exponentiation(&miller_loop(p, q)))
}

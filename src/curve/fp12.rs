//! Degree-12 extension `F_q¹² = F_q²[z] / (z⁶ - u)`.
//!
//! An element is the coefficient vector `c0 + c1·z + … + c5·z⁵` over [`Fp2`]. Products of
//! degree ≥ 6 fold back through `z⁶ = u`.

use super::field::Field;
use super::fp::Fp;
use super::fp2::Fp2;
use super::CurveParams;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fp12 {
    pub(crate) c: [Fp2; 6],
}

impl Fp12 {
    pub fn new(c: [Fp2; 6]) -> Self {
        Fp12 { c }
    }

    /// Folds a product of up to 11 coefficients back into six.
    fn reduce(mut wide: [Fp2; 11]) -> Self {
        for k in (6..11).rev() {
            let hi = core::mem::take(&mut wide[k]);
            wide[k - 6] += hi.mul_by_u();
        }
        let [c0, c1, c2, c3, c4, c5, ..] = wide;
        Fp12::new([c0, c1, c2, c3, c4, c5])
    }

    /// Multiplies by a line evaluation `l0 + l3·z³ + l5·z⁵` with `l0 ∈ F_q`.
    pub(crate) fn mul_by_line(&self, l0: &Fp, l3: &Fp2, l5: &Fp2) -> Self {
        let mut wide: [Fp2; 11] = Default::default();
        for (i, c) in self.c.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            wide[i] += c.mul_by_fp(l0);
            wide[i + 3] += c * l3;
            wide[i + 5] += c * l5;
        }
        Self::reduce(wide)
    }

    /// `f^(q⁶)`: since `z^(q⁶) = -z`, odd coefficients change sign.
    pub fn conjugate(&self) -> Self {
        let mut c = self.c.clone();
        for odd in c.iter_mut().skip(1).step_by(2) {
            *odd = -&*odd;
        }
        Fp12::new(c)
    }

    /// `f^(q²)`: coefficients are fixed by the q²-power map, so only `z^i` picks up `γ^i`.
    pub fn frobenius_square(&self) -> Self {
        let gamma = CurveParams::sm9().frobenius_square();
        let mut c = self.c.clone();
        for (ci, g) in c.iter_mut().zip(gamma.iter()) {
            *ci = ci.mul_by_fp(g);
        }
        Fp12::new(c)
    }

    /// Square-and-multiply over a big-endian exponent.
    pub fn pow_bytes(&self, exp: &[u8]) -> Self {
        let mut acc = Fp12::one();
        for bit in crate::util::bits(exp) {
            acc = acc.square();
            if bit {
                acc = &acc * self;
            }
        }
        acc
    }
}

/// Arithmetic in `F_q⁶ = F_q²[y] / (y³ - u)` with `y = z²`, used to invert through the norm.
fn fp6_mul(a: &[Fp2; 3], b: &[Fp2; 3]) -> [Fp2; 3] {
    let c0 = &a[0] * &b[0] + (&a[1] * &b[2] + &a[2] * &b[1]).mul_by_u();
    let c1 = &a[0] * &b[1] + &a[1] * &b[0] + (&a[2] * &b[2]).mul_by_u();
    let c2 = &a[0] * &b[2] + &a[1] * &b[1] + &a[2] * &b[0];
    [c0, c1, c2]
}

fn fp6_invert(c: &[Fp2; 3]) -> Option<[Fp2; 3]> {
    let t0 = c[0].square() - (&c[1] * &c[2]).mul_by_u();
    let t1 = c[2].square().mul_by_u() - &c[0] * &c[1];
    let t2 = c[1].square() - &c[0] * &c[2];
    let det = &c[0] * &t0 + (&c[2] * &t1 + &c[1] * &t2).mul_by_u();
    let inv = det.invert()?;
    Some([t0 * &inv, t1 * &inv, t2 * &inv])
}

impl Field for Fp12 {
    fn zero() -> Self {
        Fp12::new(Default::default())
    }

    fn one() -> Self {
        let mut c: [Fp2; 6] = Default::default();
        c[0] = Fp2::one();
        Fp12::new(c)
    }

    fn is_zero(&self) -> bool {
        self.c.iter().all(Fp2::is_zero)
    }

    fn square(&self) -> Self {
        self * self
    }

    fn double(&self) -> Self {
        self + self
    }

    fn invert(&self) -> Option<Self> {
        // f = a + b·z with a, b ∈ F_q⁶, so f·conj(f) = a² - y·b² lies in F_q⁶.
        let [c0, c1, c2, c3, c4, c5] = &self.c;
        let a = [c0.clone(), c2.clone(), c4.clone()];
        let b = [c1.clone(), c3.clone(), c5.clone()];

        let aa = fp6_mul(&a, &a);
        let [bb0, bb1, bb2] = fp6_mul(&b, &b);
        let norm = [
            &aa[0] - &bb2.mul_by_u(),
            &aa[1] - &bb0,
            &aa[2] - &bb1,
        ];
        let [n0, n1, n2] = fp6_invert(&norm)?;

        Some(self.conjugate() * Fp12::new([n0, Fp2::zero(), n1, Fp2::zero(), n2, Fp2::zero()]))
    }
}

impl<'a, 'b> core::ops::Add<&'b Fp12> for &'a Fp12 {
    type Output = Fp12;

    fn add(self, rhs: &'b Fp12) -> Fp12 {
        let mut c = self.c.clone();
        for (a, b) in c.iter_mut().zip(rhs.c.iter()) {
            *a += b;
        }
        Fp12::new(c)
    }
}

impl<'a, 'b> core::ops::Sub<&'b Fp12> for &'a Fp12 {
    type Output = Fp12;

    fn sub(self, rhs: &'b Fp12) -> Fp12 {
        let mut c = self.c.clone();
        for (a, b) in c.iter_mut().zip(rhs.c.iter()) {
            *a -= b;
        }
        Fp12::new(c)
    }
}

impl<'a, 'b> core::ops::Mul<&'b Fp12> for &'a Fp12 {
    type Output = Fp12;

    fn mul(self, rhs: &'b Fp12) -> Fp12 {
        let mut wide: [Fp2; 11] = Default::default();
        for (i, a) in self.c.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.c.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                wide[i + j] += a * b;
            }
        }
        Fp12::reduce(wide)
    }
}

impl<'a> core::ops::Neg for &'a Fp12 {
    type Output = Fp12;

    fn neg(self) -> Fp12 {
        let mut c = self.c.clone();
        for a in c.iter_mut() {
            *a = -&*a;
        }
        Fp12::new(c)
    }
}

impl_binops_additive!(Fp12);
impl_binops_multiplicative!(Fp12);

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rand::RngCore;

    fn random_fp12() -> Fp12 {
        let mut rng = rand::thread_rng();
        let mut c: [Fp2; 6] = Default::default();
        for ci in c.iter_mut() {
            let mut buf = [0u8; 64];
            rng.fill_bytes(&mut buf);
            *ci = Fp2::new(
                Fp::from_biguint(&BigUint::from_bytes_be(&buf[..32])),
                Fp::from_biguint(&BigUint::from_bytes_be(&buf[32..])),
            );
        }
        Fp12::new(c)
    }

    fn z() -> Fp12 {
        let mut c: [Fp2; 6] = Default::default();
        c[1] = Fp2::one();
        Fp12::new(c)
    }

    #[test]
    fn z_to_the_sixth_is_u() {
        let z6 = z().pow_bytes(&[6]);
        let mut expected: [Fp2; 6] = Default::default();
        expected[0] = Fp2::u();

        assert_eq!(z6, Fp12::new(expected));
    }

    #[test]
    fn invert() {
        let f = random_fp12();
        assert_eq!(&f * &f.invert().unwrap(), Fp12::one());
        assert!(Fp12::zero().invert().is_none());
    }

    #[test]
    fn sparse_line_product_matches_dense() {
        let f = random_fp12();
        let g = random_fp12();
        let l0 = g.c[0].c0.clone();
        let l3 = g.c[3].clone();
        let l5 = g.c[5].clone();

        let mut dense: [Fp2; 6] = Default::default();
        dense[0] = Fp2::from_fp(l0.clone());
        dense[3] = l3.clone();
        dense[5] = l5.clone();

        assert_eq!(f.mul_by_line(&l0, &l3, &l5), f * Fp12::new(dense));
    }

    #[test]
    fn frobenius_maps_match_exponentiation() {
        let f = random_fp12();
        let q = Fp::modulus();

        let q2 = (q * q).to_bytes_be();
        assert_eq!(f.frobenius_square(), f.pow_bytes(&q2));

        let q6 = q.pow(6u32).to_bytes_be();
        assert_eq!(f.conjugate(), f.pow_bytes(&q6));
    }
}

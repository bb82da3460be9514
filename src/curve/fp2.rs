//! Quadratic extension `F_q² = F_q[u] / (u² + 2)`.

use super::field::Field;
use super::fp::Fp;
use crate::error::Error;
use arrayref::{array_refs, mut_array_refs};
use num_bigint::BigUint;

/// `c0 + c1·u` with `u² = β = -2`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fp2 {
    pub c0: Fp,
    pub c1: Fp,
}

impl Fp2 {
    pub const BYTES: usize = 64;

    pub fn new(c0: Fp, c1: Fp) -> Self {
        Fp2 { c0, c1 }
    }

    /// The adjoined root `u`.
    pub fn u() -> Self {
        Fp2::new(Fp::zero(), Fp::one())
    }

    pub fn from_fp(c0: Fp) -> Self {
        Fp2::new(c0, Fp::zero())
    }

    /// `a0 - a1·u`, which is also the q-power Frobenius since -2 is a non-residue mod q.
    pub fn conjugate(&self) -> Self {
        Fp2::new(self.c0.clone(), -&self.c1)
    }

    /// `(c0 + c1·u)·u = -2·c1 + c0·u`
    pub fn mul_by_u(&self) -> Self {
        Fp2::new(-self.c1.double(), self.c0.clone())
    }

    pub fn mul_by_fp(&self, rhs: &Fp) -> Self {
        Fp2::new(&self.c0 * rhs, &self.c1 * rhs)
    }

    pub fn pow(&self, exp: &BigUint) -> Self {
        let mut acc = Fp2::one();
        for i in (0..exp.bits()).rev() {
            acc = acc.square();
            if exp.bit(i) {
                acc = &acc * self;
            }
        }
        acc
    }

    /// Wire order is the `u` coefficient first: `c1 ‖ c0`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut buf = [0u8; 64];
        let (c1, c0) = mut_array_refs![&mut buf, 32, 32];
        *c1 = self.c1.to_bytes();
        *c0 = self.c0.to_bytes();
        buf
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, Error> {
        let (c1, c0) = array_refs![bytes, 32, 32];
        Ok(Fp2::new(Fp::from_bytes(c0)?, Fp::from_bytes(c1)?))
    }
}

impl Field for Fp2 {
    fn zero() -> Self {
        Fp2::new(Fp::zero(), Fp::zero())
    }

    fn one() -> Self {
        Fp2::new(Fp::one(), Fp::zero())
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    fn square(&self) -> Self {
        // (a + bu)² = (a² - 2b²) + 2ab·u
        let ab = &self.c0 * &self.c1;
        let c0 = self.c0.square() - self.c1.square().double();
        Fp2::new(c0, ab.double())
    }

    fn double(&self) -> Self {
        Fp2::new(self.c0.double(), self.c1.double())
    }

    fn invert(&self) -> Option<Self> {
        // 1 / (a + bu) = (a - bu) / (a² + 2b²)
        let norm = self.c0.square() + self.c1.square().double();
        norm.invert().map(|t| self.conjugate().mul_by_fp(&t))
    }
}

impl<'a, 'b> core::ops::Add<&'b Fp2> for &'a Fp2 {
    type Output = Fp2;

    fn add(self, rhs: &'b Fp2) -> Fp2 {
        Fp2::new(&self.c0 + &rhs.c0, &self.c1 + &rhs.c1)
    }
}

impl<'a, 'b> core::ops::Sub<&'b Fp2> for &'a Fp2 {
    type Output = Fp2;

    fn sub(self, rhs: &'b Fp2) -> Fp2 {
        Fp2::new(&self.c0 - &rhs.c0, &self.c1 - &rhs.c1)
    }
}

impl<'a, 'b> core::ops::Mul<&'b Fp2> for &'a Fp2 {
    type Output = Fp2;

    fn mul(self, rhs: &'b Fp2) -> Fp2 {
        let aa = &self.c0 * &rhs.c0;
        let bb = &self.c1 * &rhs.c1;
        let c1 = (&self.c0 + &self.c1) * (&rhs.c0 + &rhs.c1) - &aa - &bb;
        Fp2::new(aa - bb.double(), c1)
    }
}

impl<'a> core::ops::Neg for &'a Fp2 {
    type Output = Fp2;

    fn neg(self) -> Fp2 {
        Fp2::new(-&self.c0, -&self.c1)
    }
}

impl_binops_additive!(Fp2);
impl_binops_multiplicative!(Fp2);

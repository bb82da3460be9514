//! Short Weierstrass points `y² = x³ + b` over an arbitrary coordinate field.
//!
//! G1 and G2 only differ in their coordinate field, their `b` and their generator, which are
//! supplied through [`CurveConfig`].

use super::field::Field;
use super::scalar::{Scalar, ORDER};
use core::fmt;

pub trait CurveConfig: 'static + Sized {
    type Base: Field;

    /// The constant term `b` of the curve equation.
    fn coeff_b() -> &'static Self::Base;

    fn generator() -> &'static Affine<Self>;
}

/// A point in affine coordinates, or the point at infinity.
pub struct Affine<C: CurveConfig> {
    pub(crate) x: C::Base,
    pub(crate) y: C::Base,
    pub(crate) infinity: bool,
}

/// A point in Jacobian coordinates `(X : Y : Z)` representing `(X/Z², Y/Z³)`.
pub struct Projective<C: CurveConfig> {
    x: C::Base,
    y: C::Base,
    z: C::Base,
}

impl<C: CurveConfig> Affine<C> {
    pub fn identity() -> Self {
        Affine {
            x: C::Base::zero(),
            y: C::Base::zero(),
            infinity: true,
        }
    }

    pub fn generator() -> Self {
        C::generator().clone()
    }

    /// Builds a point from coordinates without checking the curve equation.
    pub(crate) fn new_unchecked(x: C::Base, y: C::Base) -> Self {
        Affine {
            x,
            y,
            infinity: false,
        }
    }

    /// Builds a point from coordinates that must satisfy the curve equation.
    pub fn from_xy(x: C::Base, y: C::Base) -> Option<Self> {
        let p = Self::new_unchecked(x, y);
        p.is_on_curve().then_some(p)
    }

    pub fn is_identity(&self) -> bool {
        self.infinity
    }

    pub fn x(&self) -> &C::Base {
        &self.x
    }

    pub fn y(&self) -> &C::Base {
        &self.y
    }

    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return true;
        }
        let rhs = self.x.square() * &self.x + C::coeff_b();
        self.y.square() == rhs
    }

    /// `[N]P = ∞`
    pub fn is_torsion_free(&self) -> bool {
        Projective::from(self).mul_bytes(&ORDER.to_bytes_be()).is_identity()
    }

    /// On the curve, in the order-N subgroup and not the point at infinity.
    pub fn is_valid(&self) -> bool {
        !self.infinity && self.is_on_curve() && self.is_torsion_free()
    }

    pub fn to_projective(&self) -> Projective<C> {
        Projective::from(self)
    }
}

impl<C: CurveConfig> Projective<C> {
    pub fn identity() -> Self {
        Projective {
            x: C::Base::one(),
            y: C::Base::one(),
            z: C::Base::zero(),
        }
    }

    pub fn generator() -> Self {
        Projective::from(C::generator())
    }

    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    pub fn double(&self) -> Self {
        if self.is_identity() {
            return self.clone();
        }

        // dbl-2009-l for a = 0
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let d = ((self.x.clone() + &b).square() - &a - &c).double();
        let e = a.double() + &a;
        let f = e.square();

        let x3 = f - &d.double();
        let y3 = e * &(d - &x3) - &c.double().double().double();
        let z3 = (self.y.clone() * &self.z).double();

        Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn add_jacobian(&self, rhs: &Self) -> Self {
        if self.is_identity() {
            return rhs.clone();
        }
        if rhs.is_identity() {
            return self.clone();
        }

        // add-2007-bl
        let z1z1 = self.z.square();
        let z2z2 = rhs.z.square();
        let u1 = self.x.clone() * &z2z2;
        let u2 = rhs.x.clone() * &z1z1;
        let s1 = self.y.clone() * &rhs.z * &z2z2;
        let s2 = rhs.y.clone() * &self.z * &z1z1;

        let h = u2 - &u1;
        let r = (s2 - &s1).double();
        if h.is_zero() {
            return if r.is_zero() {
                self.double()
            } else {
                Self::identity()
            };
        }

        let i = h.double().square();
        let j = h.clone() * &i;
        let v = u1 * &i;

        let x3 = r.square() - &j - &v.double();
        let y3 = r * &(v - &x3) - &(s1 * &j).double();
        let z3 = ((self.z.clone() + &rhs.z).square() - &z1z1 - &z2z2) * &h;

        Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Double-and-add over a big-endian integer.
    pub fn mul_bytes(&self, k: &[u8]) -> Self {
        let mut acc = Self::identity();
        for bit in crate::util::bits(k) {
            acc = acc.double();
            if bit {
                acc = acc.add_jacobian(self);
            }
        }
        acc
    }

    pub fn to_affine(&self) -> Affine<C> {
        match self.z.invert() {
            None => Affine::identity(),
            Some(zinv) => {
                let zinv2 = zinv.square();
                let zinv3 = zinv2.clone() * &zinv;
                Affine::new_unchecked(self.x.clone() * &zinv2, self.y.clone() * &zinv3)
            }
        }
    }
}

impl<C: CurveConfig> Clone for Affine<C> {
    fn clone(&self) -> Self {
        Affine {
            x: self.x.clone(),
            y: self.y.clone(),
            infinity: self.infinity,
        }
    }
}

impl<C: CurveConfig> Clone for Projective<C> {
    fn clone(&self) -> Self {
        Projective {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
        }
    }
}

impl<C: CurveConfig> PartialEq for Affine<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self.infinity, other.infinity) {
            (true, true) => true,
            (false, false) => self.x == other.x && self.y == other.y,
            _ => false,
        }
    }
}

impl<C: CurveConfig> Eq for Affine<C> {}

impl<C: CurveConfig> PartialEq for Projective<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_identity(), other.is_identity()) {
            (true, true) => true,
            (false, false) => {
                // X1·Z2² = X2·Z1² and Y1·Z2³ = Y2·Z1³
                let z1z1 = self.z.square();
                let z2z2 = other.z.square();
                let x_eq = self.x.clone() * &z2z2 == other.x.clone() * &z1z1;
                let y_eq = self.y.clone() * &z2z2 * &other.z == other.y.clone() * &z1z1 * &self.z;
                x_eq && y_eq
            }
            _ => false,
        }
    }
}

impl<C: CurveConfig> Eq for Projective<C> {}

impl<C: CurveConfig> fmt::Debug for Affine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.infinity {
            return write!(f, "Affine(infinity)");
        }
        f.debug_struct("Affine")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<C: CurveConfig> fmt::Debug for Projective<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_affine(), f)
    }
}

impl<'a, C: CurveConfig> From<&'a Affine<C>> for Projective<C> {
    fn from(p: &'a Affine<C>) -> Self {
        if p.infinity {
            return Projective::identity();
        }
        Projective {
            x: p.x.clone(),
            y: p.y.clone(),
            z: C::Base::one(),
        }
    }
}

impl<C: CurveConfig> From<Affine<C>> for Projective<C> {
    fn from(p: Affine<C>) -> Self {
        Projective::from(&p)
    }
}

impl<'a, C: CurveConfig> From<&'a Projective<C>> for Affine<C> {
    fn from(p: &'a Projective<C>) -> Self {
        p.to_affine()
    }
}

impl<C: CurveConfig> From<Projective<C>> for Affine<C> {
    fn from(p: Projective<C>) -> Self {
        p.to_affine()
    }
}

impl<'a, C: CurveConfig> core::ops::Neg for &'a Affine<C> {
    type Output = Affine<C>;

    fn neg(self) -> Affine<C> {
        if self.infinity {
            return self.clone();
        }
        Affine::new_unchecked(self.x.clone(), -self.y.clone())
    }
}

impl<C: CurveConfig> core::ops::Neg for Affine<C> {
    type Output = Affine<C>;

    fn neg(self) -> Affine<C> {
        -&self
    }
}

impl<'a, C: CurveConfig> core::ops::Neg for &'a Projective<C> {
    type Output = Projective<C>;

    fn neg(self) -> Projective<C> {
        Projective {
            x: self.x.clone(),
            y: -self.y.clone(),
            z: self.z.clone(),
        }
    }
}

impl<C: CurveConfig> core::ops::Neg for Projective<C> {
    type Output = Projective<C>;

    fn neg(self) -> Projective<C> {
        -&self
    }
}

impl<'a, 'b, C: CurveConfig> core::ops::Add<&'b Projective<C>> for &'a Projective<C> {
    type Output = Projective<C>;

    fn add(self, rhs: &'b Projective<C>) -> Projective<C> {
        self.add_jacobian(rhs)
    }
}

impl<'a, 'b, C: CurveConfig> core::ops::Add<&'b Affine<C>> for &'a Projective<C> {
    type Output = Projective<C>;

    fn add(self, rhs: &'b Affine<C>) -> Projective<C> {
        self.add_jacobian(&Projective::from(rhs))
    }
}

impl<'a, 'b, C: CurveConfig> core::ops::Sub<&'b Projective<C>> for &'a Projective<C> {
    type Output = Projective<C>;

    fn sub(self, rhs: &'b Projective<C>) -> Projective<C> {
        self.add_jacobian(&-rhs)
    }
}

impl<C: CurveConfig> core::ops::Add<Projective<C>> for Projective<C> {
    type Output = Projective<C>;

    fn add(self, rhs: Projective<C>) -> Projective<C> {
        self.add_jacobian(&rhs)
    }
}

impl<C: CurveConfig> core::ops::Sub<Projective<C>> for Projective<C> {
    type Output = Projective<C>;

    fn sub(self, rhs: Projective<C>) -> Projective<C> {
        &self - &rhs
    }
}

impl<'a, 'b, C: CurveConfig> core::ops::Mul<&'b Scalar> for &'a Projective<C> {
    type Output = Projective<C>;

    fn mul(self, k: &'b Scalar) -> Projective<C> {
        self.mul_bytes(&k.to_bytes())
    }
}

impl<'a, 'b, C: CurveConfig> core::ops::Mul<&'b Scalar> for &'a Affine<C> {
    type Output = Projective<C>;

    fn mul(self, k: &'b Scalar) -> Projective<C> {
        Projective::from(self).mul_bytes(&k.to_bytes())
    }
}

//! G2: the order-N group of the sextic twist `E'(F_q²): y² = x³ + 5u`.

use super::fp2::Fp2;
use super::point::{Affine, CurveConfig, Projective};
use super::CurveParams;
use crate::error::Error;
use arrayref::{array_refs, mut_array_refs};

/// Size of an encoded G2 element.
pub const G2_BYTES: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G2Config;

impl CurveConfig for G2Config {
    type Base = Fp2;

    fn coeff_b() -> &'static Fp2 {
        CurveParams::sm9().b_twist()
    }

    fn generator() -> &'static G2Affine {
        CurveParams::sm9().p2()
    }
}

pub type G2Affine = Affine<G2Config>;
pub type G2Projective = Projective<G2Config>;

impl G2Affine {
    /// `x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0`: each coordinate puts its `u` coefficient first.
    pub fn to_bytes(&self) -> [u8; G2_BYTES] {
        let mut buf = [0u8; G2_BYTES];
        if self.is_identity() {
            return buf;
        }
        let (x, y) = mut_array_refs![&mut buf, 64, 64];
        *x = self.x.to_bytes();
        *y = self.y.to_bytes();
        buf
    }

    /// Decodes a point, rejecting the all-zero encoding, coordinates outside F_q² and points
    /// off the twist.
    ///
    /// Subgroup membership is not checked here, see [`Affine::is_valid`].
    pub fn from_bytes(bytes: &[u8; G2_BYTES]) -> Result<Self, Error> {
        if bytes.iter().all(|b| *b == 0) {
            return Err(Error::InvalidEncoding("point at infinity"));
        }
        let (x, y) = array_refs![bytes, 64, 64];
        Self::from_xy(Fp2::from_bytes(x)?, Fp2::from_bytes(y)?)
            .ok_or(Error::InvalidEncoding("point is not on the twist"))
    }
}

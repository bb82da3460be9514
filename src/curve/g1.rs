//! G1: the order-N group of `E(F_q): y² = x³ + 5`.

use super::fp::Fp;
use super::point::{Affine, CurveConfig, Projective};
use super::CurveParams;
use crate::error::Error;
use arrayref::{array_refs, mut_array_refs};

/// Size of an encoded G1 element.
pub const G1_BYTES: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G1Config;

impl CurveConfig for G1Config {
    type Base = Fp;

    fn coeff_b() -> &'static Fp {
        CurveParams::sm9().b()
    }

    fn generator() -> &'static G1Affine {
        CurveParams::sm9().p1()
    }
}

pub type G1Affine = Affine<G1Config>;
pub type G1Projective = Projective<G1Config>;

impl G1Affine {
    /// `x ‖ y`, 32 bytes each. The point at infinity comes out as all zeros, which
    /// [`G1Affine::from_bytes`] rejects.
    pub fn to_bytes(&self) -> [u8; G1_BYTES] {
        let mut buf = [0u8; G1_BYTES];
        if self.is_identity() {
            return buf;
        }
        let (x, y) = mut_array_refs![&mut buf, 32, 32];
        *x = self.x.to_bytes();
        *y = self.y.to_bytes();
        buf
    }

    /// Decodes a point, rejecting the all-zero encoding, coordinates outside F_q and points
    /// off the curve.
    ///
    /// Subgroup membership is not checked here, see [`Affine::is_valid`].
    pub fn from_bytes(bytes: &[u8; G1_BYTES]) -> Result<Self, Error> {
        if bytes.iter().all(|b| *b == 0) {
            return Err(Error::InvalidEncoding("point at infinity"));
        }
        let (x, y) = array_refs![bytes, 32, 32];
        Self::from_xy(Fp::from_bytes(x)?, Fp::from_bytes(y)?)
            .ok_or(Error::InvalidEncoding("point is not on the curve"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::scalar::Scalar;
    use hex_literal::hex;

    #[test]
    fn generator_is_valid() {
        let g = G1Affine::generator();

        assert!(g.is_on_curve());
        assert!(g.is_valid());
        assert!(!G1Affine::identity().is_valid());
    }

    #[test]
    fn double_matches_add() {
        let g = G1Projective::generator();

        assert_eq!(g.double(), &g + &g);
        assert_eq!((&g.double() - &g).to_affine(), G1Affine::generator());
    }

    #[test]
    fn scalar_mul_is_linear() {
        let g = G1Affine::generator();
        let a = Scalar::from_u64(0x1234_5678_9abc);
        let b = Scalar::from_u64(0xfedc_ba98);

        let lhs = &(&g * &a) + &(&g * &b);
        let rhs = &g * &(&a + &b);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn master_public_key_vector() {
        let ke = Scalar::from_bytes(&hex!(
            "0001EDEE3778F441F8DEA3D9FA0ACC4E07EE36C93F9A08618AF4AD85CEDE1C22"
        ))
        .unwrap();
        let ppub = (&G1Affine::generator() * &ke).to_affine();

        assert_eq!(
            ppub.to_bytes(),
            hex!(
                "787ED7B8A51F3AB84E0A66003F32DA5C720B17ECA7137D39ABC66E3C80A892FF"
                "769DE61791E5ADC4B9FF85A31354900B202871279A8C49DC3F220F644C57A7B1"
            )
        );
    }

    #[test]
    fn encoding() {
        let p = (&G1Affine::generator() * &Scalar::from_u64(7)).to_affine();

        assert_eq!(G1Affine::from_bytes(&p.to_bytes()).unwrap(), p);
        assert_eq!(
            G1Affine::from_bytes(&[0u8; G1_BYTES]),
            Err(Error::InvalidEncoding("point at infinity"))
        );

        let mut off_curve = p.to_bytes();
        off_curve[63] ^= 1;
        assert_eq!(
            G1Affine::from_bytes(&off_curve),
            Err(Error::InvalidEncoding("point is not on the curve"))
        );

        let too_large = [0xffu8; G1_BYTES];
        assert!(G1Affine::from_bytes(&too_large).is_err());
    }
}

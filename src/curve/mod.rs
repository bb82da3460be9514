//! Arithmetic on the SM9 BN256 curve: the field tower, the groups G1, G2 and GT, and the
//! pairing between them.
//!
//! * `F_q² = F_q[u] / (u² - β)` with `β = -2`,
//! * `F_q¹² = F_q²[z] / (z⁶ - ξ)` with `ξ = u`,
//! * `E(F_q): y² = x³ + b` and its sextic twist `E'(F_q²): y² = x³ + b·ξ`, with `b = 5`.
//!
//! All elements are immutable values; none of the arithmetic is constant-time.

#[macro_use]
pub(crate) mod field;

mod fp;
mod fp12;
mod fp2;
mod g1;
mod g2;
mod pairing;
mod point;
mod scalar;

pub use field::Field;
pub use fp::Fp;
pub use fp12::Fp12;
pub use fp2::Fp2;
pub use g1::{G1Affine, G1Config, G1Projective, G1_BYTES};
pub use g2::{G2Affine, G2Config, G2Projective, G2_BYTES};
pub use pairing::{pairing, Gt, GT_BYTES};
pub use point::{Affine, CurveConfig, Projective};
pub use scalar::Scalar;

use hex_literal::hex;
use num_bigint::BigUint;
use once_cell::sync::Lazy;

fn fp_const(bytes: [u8; 32]) -> Fp {
    Fp::from_biguint(&BigUint::from_bytes_be(&bytes))
}

static SM9: Lazy<CurveParams> = Lazy::new(|| {
    let t = BigUint::from_bytes_be(&hex!("600000000058F98A"));
    let b = Fp::from_u64(5);
    let xi = Fp2::u();
    let half = Fp::from_biguint(&((fp::MODULUS.clone() + 1u32) >> 1u32));

    let gamma = Fp::from_biguint(&BigUint::from_bytes_be(&hex!(
        "F300000002A3A6F2780272354F8B78F4D5FC11967BE65334"
    )));
    let mut frobenius_square: [Fp; 6] = Default::default();
    frobenius_square[0] = Fp::one();
    for i in 1..6 {
        frobenius_square[i] = &frobenius_square[i - 1] * &gamma;
    }

    let p1 = Affine::new_unchecked(
        fp_const(hex!("93DE051D62BF718FF5ED0704487D01D6E1E4086909DC3280E8C4E4817C66DDDD")),
        fp_const(hex!("21FE8DDA4F21E607631065125C395BBC1C1C00CBFA6024350C464CD70A3EA616")),
    );
    let p2 = Affine::new_unchecked(
        Fp2::new(
            fp_const(hex!("3722755292130B08D2AAB97FD34EC120EE265948D19C17ABF9B7213BAF82D65B")),
            fp_const(hex!("85AEF3D078640C98597B6027B441A01FF1DD2C190F5E93C454806C11D8806141")),
        ),
        Fp2::new(
            fp_const(hex!("A7CF28D519BE3DA65F3170153D278FF247EFBA98A71A08116215BBA5C999A7C7")),
            fp_const(hex!("17509B092E845C1266BA0D262CBEE6ED0736A96FA347C8BD856DC76B84EBEB96")),
        ),
    );

    CurveParams {
        q: fp::MODULUS.clone(),
        n: scalar::ORDER.clone(),
        b_twist: xi.mul_by_fp(&b),
        b,
        beta: -Fp::from_u64(2),
        u_inv: Fp2::new(Fp::zero(), -half),
        xi,
        frobenius_x: fp_const(hex!(
            "B640000002A3A6F0E303AB4FF2EB2052A9F02115CAEF75E70F738991676AF24A"
        )),
        frobenius_y: fp_const(hex!(
            "49DB721A269967C4E0A8DEBC0783182F82555233139E9D63EFBD7B54092C756C"
        )),
        frobenius_square,
        ate_loop_count: &t * 6u32 + 2u32,
        t,
        p1,
        p2,
    }
});

/// The fixed parameters of the SM9 curve.
///
/// Built once per process and only handed out by shared reference. The groups, the field
/// tower and the pairing all read their constants from here.
#[derive(Debug)]
pub struct CurveParams {
    q: BigUint,
    n: BigUint,
    b: Fp,
    b_twist: Fp2,
    beta: Fp,
    xi: Fp2,
    u_inv: Fp2,
    frobenius_x: Fp,
    frobenius_y: Fp,
    frobenius_square: [Fp; 6],
    t: BigUint,
    ate_loop_count: BigUint,
    p1: G1Affine,
    p2: G2Affine,
}

impl CurveParams {
    pub fn sm9() -> &'static CurveParams {
        &SM9
    }

    /// The base field prime q.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The prime order N of G1, G2 and GT.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn b(&self) -> &Fp {
        &self.b
    }

    /// `b·ξ = 5u`, the constant term of the twist.
    pub fn b_twist(&self) -> &Fp2 {
        &self.b_twist
    }

    /// The quadratic non-residue `β = u²`.
    pub fn beta(&self) -> &Fp {
        &self.beta
    }

    /// The sextic non-residue `ξ = z⁶` defining the twist.
    pub fn xi(&self) -> &Fp2 {
        &self.xi
    }

    /// `u⁻¹ = -u/2`
    pub fn u_inv(&self) -> &Fp2 {
        &self.u_inv
    }

    /// `w = u^(-(q-1)/3)`: the twisted Frobenius multiplies `x^q` by this.
    pub fn frobenius_x(&self) -> &Fp {
        &self.frobenius_x
    }

    /// `u^(-(q-1)/2)`: the twisted Frobenius multiplies `y^q` by this.
    pub fn frobenius_y(&self) -> &Fp {
        &self.frobenius_y
    }

    /// Powers `γ⁰ … γ⁵` of `γ = u^((q²-1)/6)`, which lies in F_q.
    pub fn frobenius_square(&self) -> &[Fp; 6] {
        &self.frobenius_square
    }

    /// The BN parameter t.
    pub fn t(&self) -> &BigUint {
        &self.t
    }

    /// `6t + 2`
    pub fn ate_loop_count(&self) -> &BigUint {
        &self.ate_loop_count
    }

    pub fn p1(&self) -> &G1Affine {
        &self.p1
    }

    pub fn p2(&self) -> &G2Affine {
        &self.p2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bn_parameterisation() {
        let params = CurveParams::sm9();
        let t = params.t();
        let t2 = t * t;
        let t3 = &t2 * t;
        let t4 = &t3 * t;

        // q = 36t⁴ + 36t³ + 24t² + 6t + 1
        let q = &t4 * 36u32 + &t3 * 36u32 + &t2 * 24u32 + t * 6u32 + 1u32;
        assert_eq!(&q, params.q());

        // N = 36t⁴ + 36t³ + 18t² + 6t + 1
        let n = &t4 * 36u32 + &t3 * 36u32 + &t2 * 18u32 + t * 6u32 + 1u32;
        assert_eq!(&n, params.n());

        assert_eq!(params.ate_loop_count(), &BigUint::from(0x2400000000215D93Eu128));
    }

    #[test]
    fn twist_coefficient() {
        let params = CurveParams::sm9();
        let b_twist = params.xi().mul_by_fp(params.b());

        assert_eq!(&b_twist, G2Config::coeff_b());
        assert_eq!(&(params.u_inv() * &Fp2::u()), &Fp2::one());
        assert_eq!(params.xi().square(), Fp2::from_fp(params.beta().clone()));
    }
}

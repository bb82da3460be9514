use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

/// Arithmetic shared by the coordinate fields of G1 and G2.
///
/// The point arithmetic in [`crate::curve::point`] is written once against this trait.
pub trait Field:
    Sized
    + Clone
    + Eq
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
{
    fn zero() -> Self;

    fn one() -> Self;

    fn is_zero(&self) -> bool;

    fn square(&self) -> Self;

    fn double(&self) -> Self;

    /// Multiplicative inverse, `None` for zero.
    fn invert(&self) -> Option<Self>;
}

/// Defines a prime field of 256-bit elements backed by [`num_bigint::BigUint`].
///
/// Elements are always kept fully reduced, so equality is plain integer equality.
macro_rules! prime_field {
    ($(#[$attr: meta])* $name: ident, $modulus: ident) => {
        $(#[$attr])*
        #[derive(Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(num_bigint::BigUint);

        impl $name {
            /// Size of a serialized element in bytes.
            pub const BYTES: usize = 32;

            /// The prime modulus of this field.
            pub fn modulus() -> &'static num_bigint::BigUint {
                &$modulus
            }

            /// Reduces an arbitrary integer into the field.
            pub fn from_biguint(v: &num_bigint::BigUint) -> Self {
                $name(v % &*$modulus)
            }

            pub fn from_u64(v: u64) -> Self {
                Self::from_biguint(&num_bigint::BigUint::from(v))
            }

            pub fn to_biguint(&self) -> num_bigint::BigUint {
                self.0.clone()
            }

            /// Decodes a 32-byte big-endian integer, rejecting values not below the modulus.
            pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, $crate::error::Error> {
                let v = num_bigint::BigUint::from_bytes_be(bytes);
                if v >= *$modulus {
                    return Err($crate::error::Error::InvalidEncoding(concat!(
                        stringify!($name),
                        " not below modulus"
                    )));
                }
                Ok($name(v))
            }

            /// Fixed-width 32-byte big-endian encoding.
            pub fn to_bytes(&self) -> [u8; 32] {
                let raw = self.0.to_bytes_be();
                let mut buf = [0u8; 32];
                buf[32 - raw.len()..].copy_from_slice(&raw);
                buf
            }

            pub fn pow(&self, exp: &num_bigint::BigUint) -> Self {
                $name(self.0.modpow(exp, &$modulus))
            }
        }

        impl $crate::curve::field::Field for $name {
            fn zero() -> Self {
                $name(num_bigint::BigUint::default())
            }

            fn one() -> Self {
                $name(num_bigint::BigUint::from(1u8))
            }

            fn is_zero(&self) -> bool {
                num_traits::Zero::is_zero(&self.0)
            }

            fn square(&self) -> Self {
                self * self
            }

            fn double(&self) -> Self {
                self + self
            }

            fn invert(&self) -> Option<Self> {
                if num_traits::Zero::is_zero(&self.0) {
                    return None;
                }
                let exp = (*$modulus).clone() - 2u32;
                Some(self.pow(&exp))
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode_upper(self.to_bytes()))
            }
        }

        impl<'a, 'b> core::ops::Add<&'b $name> for &'a $name {
            type Output = $name;

            fn add(self, rhs: &'b $name) -> $name {
                let mut r = &self.0 + &rhs.0;
                if r >= *$modulus {
                    r -= &*$modulus;
                }
                $name(r)
            }
        }

        impl<'a, 'b> core::ops::Sub<&'b $name> for &'a $name {
            type Output = $name;

            fn sub(self, rhs: &'b $name) -> $name {
                if self.0 >= rhs.0 {
                    $name(&self.0 - &rhs.0)
                } else {
                    $name(&*$modulus - &rhs.0 + &self.0)
                }
            }
        }

        impl<'a, 'b> core::ops::Mul<&'b $name> for &'a $name {
            type Output = $name;

            fn mul(self, rhs: &'b $name) -> $name {
                $name((&self.0 * &rhs.0) % &*$modulus)
            }
        }

        impl<'a> core::ops::Neg for &'a $name {
            type Output = $name;

            fn neg(self) -> $name {
                if num_traits::Zero::is_zero(&self.0) {
                    self.clone()
                } else {
                    $name(&*$modulus - &self.0)
                }
            }
        }

        impl_binops_additive!($name);
        impl_binops_multiplicative!($name);
    };
}

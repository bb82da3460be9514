//! Operator boilerplate for the field and group types.
//!
//! Every type implements its arithmetic once on references (`&a + &b`); these macros derive
//! the owned and mixed variants together with the compound assignment operators.

macro_rules! impl_binop {
    ($t: ident, $tr: ident, $method: ident) => {
        impl<'b> core::ops::$tr<&'b $t> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: &'b $t) -> $t {
                core::ops::$tr::$method(&self, rhs)
            }
        }

        impl<'a> core::ops::$tr<$t> for &'a $t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: $t) -> $t {
                core::ops::$tr::$method(self, &rhs)
            }
        }

        impl core::ops::$tr<$t> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: $t) -> $t {
                core::ops::$tr::$method(&self, &rhs)
            }
        }
    };
}

macro_rules! impl_assign_op {
    ($t: ident, $tr: ident, $method: ident, $op: ident, $op_method: ident) => {
        impl<'b> core::ops::$tr<&'b $t> for $t {
            #[inline]
            fn $method(&mut self, rhs: &'b $t) {
                *self = core::ops::$op::$op_method(&*self, rhs);
            }
        }

        impl core::ops::$tr<$t> for $t {
            #[inline]
            fn $method(&mut self, rhs: $t) {
                *self = core::ops::$op::$op_method(&*self, &rhs);
            }
        }
    };
}

/// Derives `+`, `-` and their assignment forms from `&a + &b` and `&a - &b`.
macro_rules! impl_binops_additive {
    ($t: ident) => {
        impl_binop!($t, Add, add);
        impl_binop!($t, Sub, sub);
        impl_assign_op!($t, AddAssign, add_assign, Add, add);
        impl_assign_op!($t, SubAssign, sub_assign, Sub, sub);

        impl core::ops::Neg for $t {
            type Output = $t;

            #[inline]
            fn neg(self) -> $t {
                -&self
            }
        }
    };
}

/// Derives `*` and `*=` from `&a * &b`.
macro_rules! impl_binops_multiplicative {
    ($t: ident) => {
        impl_binop!($t, Mul, mul);
        impl_assign_op!($t, MulAssign, mul_assign, Mul, mul);
    };
}

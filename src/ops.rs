//! Operator overloads for the set algebra.
//!
//! `&`, `|`, `^` and `-` map to intersection, union, symmetric difference
//! and difference. Borrowed operands produce a fresh bitmap; an owned left
//! operand is reused as the result.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use crate::{Bitmap32, Bitmap64};

macro_rules! impl_op {
    ($ty:ty, $op:ident, $method:ident, $assign:ident, $assign_method:ident, $fresh:ident, $inplace:ident) => {
        impl $op<&$ty> for &$ty {
            type Output = $ty;

            fn $method(self, rhs: &$ty) -> $ty {
                self.$fresh(rhs)
            }
        }

        impl $op<$ty> for &$ty {
            type Output = $ty;

            fn $method(self, rhs: $ty) -> $ty {
                self.$fresh(&rhs)
            }
        }

        impl $op<&$ty> for $ty {
            type Output = $ty;

            fn $method(mut self, rhs: &$ty) -> $ty {
                self.$inplace(rhs);
                self
            }
        }

        impl $op<$ty> for $ty {
            type Output = $ty;

            fn $method(mut self, rhs: $ty) -> $ty {
                self.$inplace(&rhs);
                self
            }
        }

        impl $assign<&$ty> for $ty {
            fn $assign_method(&mut self, rhs: &$ty) {
                self.$inplace(rhs);
            }
        }

        impl $assign<$ty> for $ty {
            fn $assign_method(&mut self, rhs: $ty) {
                self.$inplace(&rhs);
            }
        }
    };
}

macro_rules! impl_set_ops {
    ($($ty:ty),*) => {
        $(
            impl_op!($ty, BitAnd, bitand, BitAndAssign, bitand_assign, and, and_inplace);
            impl_op!($ty, BitOr, bitor, BitOrAssign, bitor_assign, or, or_inplace);
            impl_op!($ty, BitXor, bitxor, BitXorAssign, bitxor_assign, xor, xor_inplace);
            impl_op!($ty, Sub, sub, SubAssign, sub_assign, andnot, andnot_inplace);
        )*
    };
}

impl_set_ops!(Bitmap32, Bitmap64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_match_methods() {
        let a: Bitmap32 = [1, 2, 3].into();
        let b: Bitmap32 = [3, 4].into();
        assert_eq!(&a & &b, a.and(&b));
        assert_eq!(&a | &b, a.or(&b));
        assert_eq!(&a ^ &b, a.xor(&b));
        assert_eq!(&a - &b, a.andnot(&b));
        assert_eq!(a.clone() | b.clone(), Bitmap32::from([1, 2, 3, 4]));
        assert_eq!(&a - b.clone(), Bitmap32::from([1, 2]));

        let mut c = a.clone();
        c ^= &b;
        assert_eq!(c, Bitmap32::from([1, 2, 4]));
        c -= b;
        assert_eq!(c, Bitmap32::from([1, 2]));
    }

    #[test]
    fn test_operators_64() {
        let a: Bitmap64 = [1, 1 << 50].into();
        let b: Bitmap64 = [1 << 50].into();
        assert_eq!(&a & &b, b);
        let mut c = a.clone();
        c &= b.clone();
        assert_eq!(c, b);
        c |= &a;
        assert_eq!(c, a);
        assert_eq!(a - b, Bitmap64::from([1]));
    }
}

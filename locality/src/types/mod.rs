//! Small value types shared by the rest of the crate: 3D vectors, 3x3
//! matrices and a fixed-capacity stack vector.

// `Vector3D` and `Matrix3` are `Copy`, so operators are only implemented by
// value. `$lhs` and `$rhs` name the operands inside `$res`.

/// Implement the binary operator `$Op` for `$Lhs` and `$Rhs`
macro_rules! impl_operator {
    ($Op:ident::$op:ident($Lhs:ty, $Rhs:ty) -> $Output:ty, |$lhs:ident, $rhs:ident| $res:expr) => {
        impl $Op<$Rhs> for $Lhs {
            type Output = $Output;
            #[inline]
            fn $op(self, $rhs: $Rhs) -> $Output {
                let $lhs = self;
                $res
            }
        }
    };
}

/// Implement the compound assignment operator `$Op` for `$Lhs` and `$Rhs`
macro_rules! impl_assign_operator {
    ($Op:ident::$op:ident($Lhs:ty, $Rhs:ty), |$lhs:ident, $rhs:ident| $body:block) => {
        impl $Op<$Rhs> for $Lhs {
            #[inline]
            fn $op(&mut self, $rhs: $Rhs) {
                let $lhs = self;
                $body
            }
        }
    };
}

mod vectors;
pub use self::vectors::Vector3D;

mod matrix;
pub use self::matrix::Matrix3;

mod stack_vec;
pub use self::stack_vec::StackVec;

use std::ops::{Add, Sub, Neg, Mul, Div, BitXor, Index, IndexMut};
use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};

/// A 3-dimensional vector type, used for positions, periodic image
/// translations and lattice vectors.
///
/// The usual arithmetic operators are implemented, with `a * b` being the
/// dot product and `a ^ b` the cross product.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(transparent)]
pub struct Vector3D([f64; 3]);

impl Vector3D {
    /// Create a new `Vector3D` with components `x`, `y`, `z`
    pub const fn new(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D([x, y, z])
    }

    /// Create a new `Vector3D` with all components set to 0
    pub const fn zero() -> Vector3D {
        Vector3D([0.0, 0.0, 0.0])
    }

    /// Get the squared euclidean norm of this vector
    #[inline]
    pub fn norm2(&self) -> f64 {
        *self * *self
    }

    /// Get the euclidean norm of this vector
    #[inline]
    pub fn norm(&self) -> f64 {
        f64::sqrt(self.norm2())
    }

    /// Get a normalized version of this vector
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Vector3D {
        *self / self.norm()
    }

    /// Get the smallest component of this vector
    pub fn min(&self) -> f64 {
        f64::min(f64::min(self[0], self[1]), self[2])
    }

    /// Get the largest component of this vector
    pub fn max(&self) -> f64 {
        f64::max(f64::max(self[0], self[1]), self[2])
    }

    /// Get the component-wise minimum of `self` and `other`
    #[must_use]
    pub fn component_min(&self, other: Vector3D) -> Vector3D {
        Vector3D::new(
            f64::min(self[0], other[0]),
            f64::min(self[1], other[1]),
            f64::min(self[2], other[2]),
        )
    }

    /// Get the component-wise maximum of `self` and `other`
    #[must_use]
    pub fn component_max(&self, other: Vector3D) -> Vector3D {
        Vector3D::new(
            f64::max(self[0], other[0]),
            f64::max(self[1], other[1]),
            f64::max(self[2], other[2]),
        )
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(array: [f64; 3]) -> Vector3D {
        Vector3D(array)
    }
}

impl From<Vector3D> for [f64; 3] {
    fn from(vector: Vector3D) -> [f64; 3] {
        vector.0
    }
}

impl AsRef<[f64; 3]> for Vector3D {
    fn as_ref(&self) -> &[f64; 3] {
        &self.0
    }
}

impl Index<usize> for Vector3D {
    type Output = f64;
    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Vector3D {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl_operator!(Add::add(Vector3D, Vector3D) -> Vector3D, |a, b| {
    Vector3D::new(a[0] + b[0], a[1] + b[1], a[2] + b[2])
});

impl_operator!(Sub::sub(Vector3D, Vector3D) -> Vector3D, |a, b| {
    Vector3D::new(a[0] - b[0], a[1] - b[1], a[2] - b[2])
});

// dot product
impl_operator!(Mul::mul(Vector3D, Vector3D) -> f64, |a, b| {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
});

// cross product
impl_operator!(BitXor::bitxor(Vector3D, Vector3D) -> Vector3D, |a, b| {
    Vector3D::new(
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    )
});

impl_operator!(Mul::mul(Vector3D, f64) -> Vector3D, |v, s| {
    Vector3D::new(v[0] * s, v[1] * s, v[2] * s)
});

impl_operator!(Mul::mul(f64, Vector3D) -> Vector3D, |s, v| {
    Vector3D::new(s * v[0], s * v[1], s * v[2])
});

impl_operator!(Div::div(Vector3D, f64) -> Vector3D, |v, s| {
    Vector3D::new(v[0] / s, v[1] / s, v[2] / s)
});

impl_assign_operator!(AddAssign::add_assign(Vector3D, Vector3D), |a, b| {
    a[0] += b[0];
    a[1] += b[1];
    a[2] += b[2];
});

impl_assign_operator!(SubAssign::sub_assign(Vector3D, Vector3D), |a, b| {
    a[0] -= b[0];
    a[1] -= b[1];
    a[2] -= b[2];
});

impl_assign_operator!(MulAssign::mul_assign(Vector3D, f64), |v, s| {
    v[0] *= s;
    v[1] *= s;
    v[2] *= s;
});

impl_assign_operator!(DivAssign::div_assign(Vector3D, f64), |v, s| {
    v[0] /= s;
    v[1] /= s;
    v[2] /= s;
});

impl Neg for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        Vector3D::new(-self[0], -self[1], -self[2])
    }
}

impl approx::AbsDiffEq for Vector3D {
    type Epsilon = <f64 as approx::AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self[0], &other[0], epsilon) &&
        f64::abs_diff_eq(&self[1], &other[1], epsilon) &&
        f64::abs_diff_eq(&self[2], &other[2], epsilon)
    }
}

impl approx::RelativeEq for Vector3D {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        f64::relative_eq(&self[0], &other[0], epsilon, max_relative) &&
        f64::relative_eq(&self[1], &other[1], epsilon, max_relative) &&
        f64::relative_eq(&self[2], &other[2], epsilon, max_relative)
    }
}

impl approx::UlpsEq for Vector3D {
    fn default_max_ulps() -> u32 {
        f64::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: Self::Epsilon, max_ulps: u32) -> bool {
        f64::ulps_eq(&self[0], &other[0], epsilon, max_ulps) &&
        f64::ulps_eq(&self[1], &other[1], epsilon, max_ulps) &&
        f64::ulps_eq(&self[2], &other[2], epsilon, max_ulps)
    }
}

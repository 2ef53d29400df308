//! The `SimulationBox` type represents the enclosing box of a particle
//! configuration, with periodic boundary conditions along some or all of its
//! axes.
use crate::{Matrix3, Vector3D};

/// The shape of a box determines how fractional coordinates are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxShape {
    /// Orthorhombic box, with cuboid (or rectangular in 2D) shape
    Orthorhombic,
    /// Triclinic box, with arbitrary parallelepiped (or parallelogram) shape
    Triclinic,
}

/// A `SimulationBox` defines the physical boundaries of a system.
///
/// The box is centered on the origin: a point is inside the box if its
/// fractional coordinates are in `[-1/2, 1/2)`. Lattice vectors are stored as
/// the rows of the box matrix.
///
/// Two dimensional boxes only use the first two lattice vectors; the `z`
/// coordinate of points is ignored by neighbor searches in 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    /// Box matrix, one lattice vector per row
    matrix: Matrix3,
    /// Transpose of the box matrix, cached from matrix
    transpose: Matrix3,
    /// Inverse of the transpose of the box matrix, cached from matrix
    inverse: Matrix3,
    /// Periodic boundary conditions along each lattice vector
    periodic: [bool; 3],
    /// Is this a two dimensional box?
    is_2d: bool,
    /// Box shape
    shape: BoxShape,
}

impl From<Matrix3> for SimulationBox {
    fn from(matrix: Matrix3) -> SimulationBox {
        SimulationBox::with_matrix(matrix, false)
    }
}

impl SimulationBox {
    fn with_matrix(matrix: Matrix3, is_2d: bool) -> SimulationBox {
        assert!(matrix.determinant() > 1e-6, "matrix is not invertible");

        let is_close_0 = |value| f64::abs(value) < 1e-6;
        let is_diagonal = |matrix: Matrix3| {
            is_close_0(matrix[0][1]) && is_close_0(matrix[0][2]) &&
            is_close_0(matrix[1][0]) && is_close_0(matrix[1][2]) &&
            is_close_0(matrix[2][0]) && is_close_0(matrix[2][1])
        };

        let shape = if is_diagonal(matrix) {
            BoxShape::Orthorhombic
        } else {
            BoxShape::Triclinic
        };

        return SimulationBox {
            matrix: matrix,
            transpose: matrix.transposed(),
            inverse: matrix.transposed().inverse(),
            periodic: [true, true, !is_2d],
            is_2d: is_2d,
            shape: shape,
        };
    }

    /// Create an orthorhombic box, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> SimulationBox {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "box lengths must be positive");
        SimulationBox::with_matrix(Matrix3::new([
            [a, 0.0, 0.0],
            [0.0, b, 0.0],
            [0.0, 0.0, c]
        ]), false)
    }

    /// Create a cubic box, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> SimulationBox {
        SimulationBox::orthorhombic(length, length, length)
    }

    /// Create a triclinic box, with side lengths `a, b, c` and angles
    /// `alpha, beta, gamma` (in degrees).
    pub fn triclinic(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> SimulationBox {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "box lengths must be positive");
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let b_x = b * cos_gamma;
        let b_y = b * sin_gamma;

        let c_x = c * cos_beta;
        let c_y = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c_z = f64::sqrt(c * c - c_y * c_y - c_x * c_x);

        return SimulationBox::from(Matrix3::new([
            [a,   0.0, 0.0],
            [b_x, b_y, 0.0],
            [c_x, c_y, c_z],
        ]));
    }

    /// Create a two dimensional rectangular box with side lengths `a, b`.
    pub fn rectangle(a: f64, b: f64) -> SimulationBox {
        assert!(a > 0.0 && b > 0.0, "box lengths must be positive");
        SimulationBox::with_matrix(Matrix3::new([
            [a, 0.0, 0.0],
            [0.0, b, 0.0],
            [0.0, 0.0, 1.0]
        ]), true)
    }

    /// Create a two dimensional square box with side length `length`.
    pub fn square(length: f64) -> SimulationBox {
        SimulationBox::rectangle(length, length)
    }

    /// Create a two dimensional box from the first two lattice vectors. Only
    /// the `x` and `y` components of the vectors are used.
    pub fn parallelogram(a: Vector3D, b: Vector3D) -> SimulationBox {
        SimulationBox::with_matrix(Matrix3::new([
            [a[0], a[1], 0.0],
            [b[0], b[1], 0.0],
            [0.0, 0.0, 1.0]
        ]), true)
    }

    /// Set the periodic boundary conditions along each lattice vector. In
    /// two dimensions, the third value is ignored.
    #[must_use]
    pub fn with_periodic(mut self, periodic: [bool; 3]) -> SimulationBox {
        self.periodic = periodic;
        if self.is_2d {
            self.periodic[2] = false;
        }
        return self;
    }

    /// Get the box shape
    pub fn shape(&self) -> BoxShape {
        self.shape
    }

    /// Is this a two dimensional box?
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Get the periodic boundary conditions along each lattice vector
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Get the number of spatial dimensions of this box (2 or 3)
    pub fn dimensions(&self) -> usize {
        if self.is_2d { 2 } else { 3 }
    }

    /// Get the matricial representation of the box
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the lattice vector with the given `index`. The third lattice
    /// vector of a two dimensional box is the zero vector.
    pub fn lattice_vector(&self, index: usize) -> Vector3D {
        assert!(index < 3, "lattice vector index must be 0, 1 or 2");
        if self.is_2d && index == 2 {
            return Vector3D::zero();
        }
        return self.matrix[index].into();
    }

    /// Get the distances between opposite faces of the box. In two
    /// dimensions, these are the distances between opposite edges and the
    /// third component is infinite.
    pub fn nearest_plane_distance(&self) -> Vector3D {
        let a: Vector3D = self.matrix[0].into();
        let b: Vector3D = self.matrix[1].into();
        let c: Vector3D = self.matrix[2].into();
        if self.is_2d {
            // in-plane normals to the edges
            let z = Vector3D::new(0.0, 0.0, 1.0);
            let na: Vector3D = (b ^ z).normalized();
            let nb: Vector3D = (z ^ a).normalized();
            return Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::INFINITY);
        }

        // planes normal vectors
        let na: Vector3D = (b ^ c).normalized();
        let nb: Vector3D = (c ^ a).normalized();
        let nc: Vector3D = (a ^ b).normalized();

        Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::abs(nc * c))
    }

    /// Get the smallest distance between opposite faces of the box,
    /// considering only the dimensions of this box.
    pub fn min_nearest_plane_distance(&self) -> f64 {
        let distances = self.nearest_plane_distance();
        if self.is_2d {
            f64::min(distances[0], distances[1])
        } else {
            distances.min()
        }
    }

    /// Get the volume of the box, or its area in two dimensions
    pub fn volume(&self) -> f64 {
        let a: Vector3D = self.matrix[0].into();
        let b: Vector3D = self.matrix[1].into();
        if self.is_2d {
            return f64::abs((a ^ b)[2]);
        }
        let c: Vector3D = self.matrix[2].into();
        return f64::abs(a * (b ^ c));
    }
}

/// Geometric operations using periodic boundary conditions
impl SimulationBox {
    /// Get the fractional representation of the `vector` in this box. Points
    /// inside the box have fractional coordinates in `[0, 1)`.
    pub fn fractional(&self, vector: Vector3D) -> Vector3D {
        // this needs to use the inverse of the transpose of the matrix, since
        // we only have code to multiply a vector by a matrix on the left
        let mut fractional = self.inverse * vector;
        fractional[0] += 0.5;
        fractional[1] += 0.5;
        if self.is_2d {
            fractional[2] = 0.0;
        } else {
            fractional[2] += 0.5;
        }
        return fractional;
    }

    /// Get the Cartesian representation of the `fractional` vector in this
    /// box. This is the inverse of [`SimulationBox::fractional`].
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        let mut centered = fractional;
        centered[0] -= 0.5;
        centered[1] -= 0.5;
        if self.is_2d {
            centered[2] = 0.0;
        } else {
            centered[2] -= 0.5;
        }
        return self.transpose * centered;
    }

    /// Wrap a vector in the box, obeying the periodic boundary conditions.
    ///
    /// Along periodic directions, the fractional coordinates of the result are
    /// in `[-1/2, 1/2)`, making this the minimum image convention for
    /// distance vectors and mapping points back inside the box. Non periodic
    /// directions are left untouched.
    #[allow(clippy::float_cmp)]
    pub fn wrap(&self, vector: Vector3D) -> Vector3D {
        let mut fractional = self.inverse * vector;
        let mut changed = false;
        for xyz in 0..3 {
            if self.periodic[xyz] {
                let shift = f64::floor(fractional[xyz] + 0.5);
                if shift != 0.0 {
                    fractional[xyz] -= shift;
                    changed = true;
                }
            }
        }

        if !changed {
            return vector;
        }

        return self.transpose * fractional;
    }

    /// Periodic boundary conditions squared distance between the point `u` and
    /// the point `v`
    pub fn distance2(&self, u: Vector3D, v: Vector3D) -> f64 {
        let mut d = self.wrap(v - u);
        if self.is_2d {
            d[2] = 0.0;
        }
        return d.norm2();
    }

    /// Periodic boundary conditions distance between the point `u` and
    /// the point `v`
    pub fn distance(&self, u: Vector3D, v: Vector3D) -> f64 {
        return f64::sqrt(self.distance2(u, v));
    }
}

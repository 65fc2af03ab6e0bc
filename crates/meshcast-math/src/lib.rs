#![warn(missing_docs)]

//! Math types for meshcast.
//!
//! Thin aliases over nalgebra for points and vectors, plus an affine
//! [`Transform`] used to bring mesh vertices from local into world space.

use nalgebra::{Matrix4, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 4x4 affine transformation (local-to-world for mesh placement).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying homogeneous matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self::from_matrix(Matrix4::identity())
    }

    /// Wrap an existing homogeneous matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Translation by `offset`.
    pub fn translation(offset: Vec3) -> Self {
        Self::from_matrix(Matrix4::new_translation(&offset))
    }

    /// Non-uniform scale along each axis.
    pub fn scale(factors: Vec3) -> Self {
        Self::from_matrix(Matrix4::new_nonuniform_scaling(&factors))
    }

    /// Rotation from roll (X), pitch (Y) and yaw (Z) angles in radians.
    pub fn rotation(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::from_matrix(Matrix4::from_euler_angles(roll, pitch, yaw))
    }

    /// Compose: the result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self::from_matrix(self.matrix * other.matrix)
    }

    /// Transform a point (translation applies).
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Transform a direction (translation ignored).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

//! Query outcome handed back to callers.

use meshcast_math::{Point3, Vec3};

/// Outcome of a mesh ray cast.
///
/// When `hit` is false every other field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshRaycastResult {
    /// Whether any triangle was hit.
    pub hit: bool,
    /// World-space hit point.
    pub position: Point3,
    /// Unit normal of the hit triangle.
    pub normal: Vec3,
    /// Parameter along the ray, in units of the direction's length.
    pub distance: f64,
}

impl MeshRaycastResult {
    /// A successful hit.
    pub fn new(position: Point3, normal: Vec3, distance: f64) -> Self {
        Self {
            hit: true,
            position,
            normal,
            distance,
        }
    }

    /// No hit.
    pub fn miss() -> Self {
        Self::default()
    }

    /// The hit as a [`RayHit`], or `None` on a miss.
    pub fn to_hit(&self) -> Option<RayHit> {
        self.hit.then(|| RayHit {
            t: self.distance,
            point: self.position,
            normal: self.normal,
        })
    }
}

/// Engine-facing hit record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parameter along the ray where intersection occurs.
    pub t: f64,
    /// 3D intersection point.
    pub point: Point3,
    /// Surface normal at the intersection.
    pub normal: Vec3,
}

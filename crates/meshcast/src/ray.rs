//! Ray representation.

use meshcast_math::{Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// The direction is kept exactly as given. Hit distances are measured in
/// multiples of its length, so `ray.at(hit.distance)` is the hit point
/// whether or not the direction is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Direction of the ray, not necessarily normalized.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_direction_not_normalized() {
        let ray = Ray::new(Point3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction.z, -4.0);
        assert_eq!(ray.at(0.25), Point3::new(1.0, 1.0, 0.0));
    }
}

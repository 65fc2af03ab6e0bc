//! Ray-triangle intersection (Möller–Trumbore).
//!
//! This is the only place the intersection math lives. The sequential
//! tracer, the rayon backend and the cache all call [`intersect_triangle`];
//! the WGSL program in `gpu::shaders` mirrors it line for line.

use meshcast_math::Vec3;

use crate::mesh::Triangle;
use crate::Ray;

/// A successful ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleIntersection {
    /// Parameter along the ray, in units of the direction's length.
    pub distance: f64,
    /// Barycentric weight of `v1`.
    pub u: f64,
    /// Barycentric weight of `v2`.
    pub v: f64,
    /// Unit normal `normalize(e1 x e2)`, following the triangle winding.
    pub normal: Vec3,
}

/// Intersect a ray with a triangle.
///
/// Culling is single-sided: a determinant below `epsilon` is a miss. That
/// rejects triangles seen from behind as well as edge-on ones, so only
/// triangles wound counter-clockwise as seen from the ray origin can be hit.
/// Points on an edge or vertex count as inside.
///
/// On top of the plain Möller–Trumbore steps, a distance that is negative
/// (plane behind the origin) or NaN (non-finite ray) is a miss.
#[inline]
pub fn intersect_triangle(ray: &Ray, tri: &Triangle, epsilon: f64) -> Option<TriangleIntersection> {
    let (e1, e2) = tri.edges();

    let pvec = ray.direction.cross(&e2);
    let det = e1.dot(&pvec);

    // Not |det|: back faces are culled along with parallel rays.
    if det < epsilon {
        return None;
    }

    let tvec = ray.origin - tri.v0;
    let u = tvec.dot(&pvec);
    if u < 0.0 || u > det {
        return None;
    }

    let qvec = tvec.cross(&e1);
    let v = ray.direction.dot(&qvec);
    if v < 0.0 || u + v > det {
        return None;
    }

    let inv_det = 1.0 / det;
    let distance = e2.dot(&qvec) * inv_det;
    // Also rejects NaN, which slips through every comparison above.
    if !(distance >= 0.0) {
        return None;
    }

    Some(TriangleIntersection {
        distance,
        u: u * inv_det,
        v: v * inv_det,
        normal: tri.normal(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DET_EPSILON;
    use approx::assert_relative_eq;
    use meshcast_math::Point3;

    fn ccw_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    fn down(x: f64, y: f64, z: f64) -> Ray {
        Ray::new(Point3::new(x, y, z), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_hit_interior() {
        let hit = intersect_triangle(&down(0.25, 0.25, 3.0), &ccw_triangle(), DET_EPSILON).unwrap();
        assert_relative_eq!(hit.distance, 3.0);
        assert_relative_eq!(hit.u, 0.25);
        assert_relative_eq!(hit.v, 0.25);
        assert_relative_eq!(hit.normal, Vec3::z());
    }

    #[test]
    fn test_distance_scales_with_direction_length() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 3.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = intersect_triangle(&ray, &ccw_triangle(), DET_EPSILON).unwrap();
        assert_relative_eq!(hit.distance, 1.5);
        assert_relative_eq!(ray.at(hit.distance), Point3::new(0.25, 0.25, 0.0));
    }

    #[test]
    fn test_interior_sweep_matches_analytic_distance() {
        // Tilted triangle; compare against plane-intersection distance.
        let tri = Triangle::new(
            Point3::new(-1.0, -1.0, 0.5),
            Point3::new(2.0, -1.0, -0.5),
            Point3::new(-1.0, 2.0, 1.0),
        );
        let n = tri.normal();
        for i in 1..10 {
            for j in 1..(10 - i) {
                let u = i as f64 / 10.0;
                let v = j as f64 / 10.0;
                let target = tri.v0 + (tri.v1 - tri.v0) * u + (tri.v2 - tri.v0) * v;
                let origin = target + Vec3::new(0.3, -0.2, 4.0);
                let ray = Ray::new(origin, target - origin);

                let expected = (tri.v0 - ray.origin).dot(&n) / ray.direction.dot(&n);
                let hit = intersect_triangle(&ray, &tri, DET_EPSILON)
                    .unwrap_or_else(|| panic!("miss at u={u} v={v}"));
                assert_relative_eq!(hit.distance, expected, epsilon = 1e-9);
                assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-9);
                assert_relative_eq!(hit.u, u, epsilon = 1e-9);
                assert_relative_eq!(hit.v, v, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_miss_outside() {
        assert!(intersect_triangle(&down(0.8, 0.8, 1.0), &ccw_triangle(), DET_EPSILON).is_none());
        assert!(intersect_triangle(&down(-0.1, 0.5, 1.0), &ccw_triangle(), DET_EPSILON).is_none());
        assert!(intersect_triangle(&down(0.5, -0.1, 1.0), &ccw_triangle(), DET_EPSILON).is_none());
    }

    #[test]
    fn test_edges_and_vertices_are_inside() {
        let tri = ccw_triangle();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.5, 0.5), (0.5, 0.0)] {
            assert!(intersect_triangle(&down(x, y, 1.0), &tri, DET_EPSILON).is_some(), "({x}, {y})");
        }
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Point3::new(-1.0, 0.25, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&ray, &ccw_triangle(), DET_EPSILON).is_none());

        let above = Ray::new(Point3::new(-1.0, 0.25, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&above, &ccw_triangle(), DET_EPSILON).is_none());
    }

    #[test]
    fn test_back_face_is_culled() {
        let up = Ray::new(Point3::new(0.25, 0.25, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&up, &ccw_triangle(), DET_EPSILON).is_none());

        let tri = ccw_triangle();
        let flipped = Triangle::new(tri.v0, tri.v2, tri.v1);
        assert!(intersect_triangle(&up, &flipped, DET_EPSILON).is_some());
        assert!(intersect_triangle(&down(0.25, 0.25, 1.0), &flipped, DET_EPSILON).is_none());
    }

    #[test]
    fn test_behind_origin_misses() {
        assert!(intersect_triangle(&down(0.25, 0.25, -1.0), &ccw_triangle(), DET_EPSILON).is_none());
    }

    #[test]
    fn test_nan_ray_misses() {
        let tri = ccw_triangle();
        let nan_dir = Ray::new(Point3::new(0.25, 0.25, 1.0), Vec3::new(f64::NAN, 0.0, -1.0));
        assert!(intersect_triangle(&nan_dir, &tri, DET_EPSILON).is_none());

        let nan_origin = Ray::new(Point3::new(0.25, f64::NAN, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect_triangle(&nan_origin, &tri, DET_EPSILON).is_none());
    }

    #[test]
    fn test_origin_on_plane_hits_at_zero() {
        let hit = intersect_triangle(&down(0.25, 0.25, 0.0), &ccw_triangle(), DET_EPSILON).unwrap();
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_degenerate_triangle_misses() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(intersect_triangle(&down(0.5, 0.0, 1.0), &tri, DET_EPSILON).is_none());
    }

    #[test]
    fn test_larger_epsilon_rejects_grazing_rays() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 1e-3), Vec3::new(1.0, 0.0, -1e-3));
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        );
        assert!(intersect_triangle(&ray, &tri, DET_EPSILON).is_some());
        assert!(intersect_triangle(&ray, &tri, 1.0).is_none());
    }
}

//! End-to-end queries through the public API.

use approx::assert_relative_eq;
use meshcast::dispatch::sequential;
use meshcast::{
    raycast, GeometryCache, MeshGeometry, NullSink, ParallelBackend, Ray, RaycastConfig,
    SequentialBackend, TriangleMesh, DET_EPSILON,
};
use meshcast_math::{Point3, Transform, Vec3};

fn down_from(x: f64, y: f64, z: f64) -> Ray {
    Ray::new(Point3::new(x, y, z), Vec3::new(0.0, 0.0, -1.0))
}

#[test]
fn test_unit_square_scenario() {
    let mesh = TriangleMesh::quad(0.5);
    let result = raycast(&down_from(0.0, 0.0, 1.0), &mesh, &Transform::identity()).unwrap();

    assert!(result.hit);
    assert_eq!(result.position, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(result.normal, Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(result.distance, 1.0);
}

#[test]
fn test_empty_mesh_is_a_miss() {
    let result = raycast(&down_from(0.0, 0.0, 1.0), &TriangleMesh::default(), &Transform::identity())
        .unwrap();
    assert!(!result.hit);
    assert_eq!(result.distance, 0.0);
}

#[test]
fn test_looking_away_misses() {
    let mesh = TriangleMesh::quad(1.0);
    let up = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
    assert!(!raycast(&up, &mesh, &Transform::identity()).unwrap().hit);
}

/// Two separate triangles under the ray at z = 0 and z = -2.
fn stacked(near_first: bool) -> TriangleMesh {
    let tri = |z: f64| {
        [
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    };
    let (a, b) = if near_first { (tri(0.0), tri(-2.0)) } else { (tri(-2.0), tri(0.0)) };
    TriangleMesh::new(a.into_iter().chain(b).collect(), vec![0, 1, 2, 3, 4, 5])
}

#[test]
fn test_nearest_wins_regardless_of_order() {
    let ray = down_from(0.0, 0.0, 3.0);
    for near_first in [true, false] {
        let result = raycast(&ray, &stacked(near_first), &Transform::identity()).unwrap();
        assert!(result.hit);
        assert_eq!(result.distance, 3.0);
        assert_eq!(result.position.z, 0.0);
    }
}

/// A flat triangle and a tilted one, both crossing the origin at the same
/// ray distance but with different normals.
fn tied(flat_first: bool) -> TriangleMesh {
    let flat = [
        Point3::new(-1.0, -1.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let tilted = [
        Point3::new(-1.0, -1.0, -1.0),
        Point3::new(1.0, -1.0, 1.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let (a, b) = if flat_first { (flat, tilted) } else { (tilted, flat) };
    TriangleMesh::new(a.into_iter().chain(b).collect(), vec![0, 1, 2, 3, 4, 5])
}

#[test]
fn test_ties_resolve_to_highest_index() {
    let ray = down_from(0.0, 0.0, 1.0);
    let tilted_normal = Vec3::new(-1.0, 0.0, 1.0).normalize();

    let result = raycast(&ray, &tied(true), &Transform::identity()).unwrap();
    assert_eq!(result.distance, 1.0);
    assert_relative_eq!(result.normal, tilted_normal);

    let result = raycast(&ray, &tied(false), &Transform::identity()).unwrap();
    assert_eq!(result.distance, 1.0);
    assert_eq!(result.normal, Vec3::z());
}

#[test]
fn test_repeat_query_is_bit_identical() {
    let mesh = TriangleMesh::cuboid(Vec3::new(1.0, 2.0, 0.5));
    let transform = Transform::rotation(0.4, -0.3, 1.2);
    let ray = Ray::new(Point3::new(3.0, 2.5, 4.0), Vec3::new(-0.6, -0.5, -0.8));
    let mut cache = GeometryCache::new(ParallelBackend::default(), RaycastConfig::default());

    let first = cache.raycast(&ray, &mesh, &transform).unwrap();
    let second = cache.raycast(&ray, &mesh, &transform).unwrap();
    assert!(first.hit);
    assert_eq!(first.distance.to_bits(), second.distance.to_bits());
    assert_eq!(first, second);
}

#[test]
fn test_world_transform_is_applied() {
    let mesh = TriangleMesh::quad(1.0);
    let transform = Transform::translation(Vec3::new(10.0, 0.0, -3.0));

    let result = raycast(&down_from(10.2, 0.3, 1.0), &mesh, &transform).unwrap();
    assert!(result.hit);
    assert_eq!(result.distance, 4.0);

    let result = raycast(&down_from(0.2, 0.3, 1.0), &mesh, &transform).unwrap();
    assert!(!result.hit);
}

#[test]
fn test_unnormalized_direction_scales_distance() {
    let mesh = TriangleMesh::quad(1.0);
    let ray = Ray::new(Point3::new(0.1, 0.2, 6.0), Vec3::new(0.0, 0.0, -3.0));
    let result = raycast(&ray, &mesh, &Transform::identity()).unwrap();
    assert_relative_eq!(result.distance, 2.0);
    assert_relative_eq!(result.position, Point3::new(0.1, 0.2, 0.0));
}

#[test]
fn test_sequential_and_parallel_agree() {
    let mesh = TriangleMesh::cuboid(Vec3::new(1.5, 1.0, 0.75));
    let transform = Transform::translation(Vec3::new(0.2, -0.1, 0.3))
        .then(&Transform::rotation(0.5, 0.25, -0.8));
    let geometry = MeshGeometry::from_source(&mesh, &transform).unwrap();
    let config = RaycastConfig::default();

    let mut parallel = GeometryCache::new(ParallelBackend::new(5), config);
    let mut in_order = GeometryCache::new(SequentialBackend, config);

    let mut hits = 0;
    for i in 0..12 {
        for j in 0..12 {
            let theta = i as f64 * 0.52;
            let phi = -1.3 + j as f64 * 0.23;
            let origin = Point3::new(
                4.0 * theta.cos() * phi.cos(),
                4.0 * theta.sin() * phi.cos(),
                4.0 * phi.sin(),
            );
            let aim = Point3::new(0.3 * (i as f64).sin(), 0.2 * (j as f64).cos(), 0.1);
            let ray = Ray::new(origin, aim - origin);

            let a = parallel.raycast(&ray, &mesh, &transform).unwrap();
            let b = in_order.raycast(&ray, &mesh, &transform).unwrap();
            assert_eq!(a, b);

            let traced = sequential::trace(&ray, &geometry, DET_EPSILON, &mut NullSink);
            let nearest = traced.iter().map(|h| h.distance).fold(f64::INFINITY, f64::min);
            assert_eq!(a.hit, !traced.is_empty());
            if a.hit {
                hits += 1;
                assert_relative_eq!(a.distance, nearest);
            }
        }
    }
    assert!(hits > 0);
}

#[test]
fn test_dense_grid_parallel() {
    let mesh = TriangleMesh::grid(200, 20.0);
    assert_eq!(mesh.num_triangles(), 80_000);
    let mut cache = GeometryCache::new(ParallelBackend::new(256), RaycastConfig::default());

    let ray = Ray::new(Point3::new(3.33, -7.21, 2.0), Vec3::new(0.0, 0.0, -0.5));
    let result = cache.raycast(&ray, &mesh, &Transform::identity()).unwrap();
    assert!(result.hit);
    assert_relative_eq!(result.distance, 4.0);
    assert_relative_eq!(result.position, Point3::new(3.33, -7.21, 0.0));
    assert_eq!(cache.groups(), Some([80_000 / 256 + 1 + 1, 1, 1]));
}

#[test]
fn test_config_from_toml_drives_backend() {
    let config = RaycastConfig::from_toml_str("group_width = 3").unwrap();
    let mut cache = GeometryCache::new(ParallelBackend::from_config(&config), config);
    let result = cache
        .raycast(&down_from(0.4, 0.1, 1.0), &TriangleMesh::grid(5, 2.0), &Transform::identity())
        .unwrap();
    assert!(result.hit);
    assert_eq!(cache.groups(), Some([50usize.div_ceil(3) as u32 + 1, 1, 1]));
}

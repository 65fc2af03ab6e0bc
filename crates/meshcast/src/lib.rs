#![warn(missing_docs)]

//! Nearest-hit ray casting against triangle meshes.
//!
//! A single Möller–Trumbore kernel is shared by every execution strategy, so
//! the sequential (debug draw) path and the data-parallel path agree on
//! every triangle.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray with an unnormalized direction
//! - [`kernel`] - Ray-triangle intersection
//! - [`dispatch`] - Sequential and parallel strategies behind [`ComputeBackend`]
//! - [`reduce`] - Nearest-hit selection over per-triangle outcomes
//! - [`GeometryCache`] - Staged world-space geometry, reused across queries
//! - [`MeshRaycastResult`] - The outcome handed back to callers
//!
//! # Example
//!
//! ```
//! use meshcast::{raycast, Ray, TriangleMesh};
//! use meshcast_math::{Point3, Transform, Vec3};
//!
//! let mesh = TriangleMesh::quad(1.0);
//! let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
//!
//! let result = raycast(&ray, &mesh, &Transform::identity()).unwrap();
//! assert!(result.hit);
//! assert_eq!(result.distance, 1.0);
//! ```

mod cache;
mod config;
pub mod debug;
pub mod dispatch;
mod error;
pub mod kernel;
mod mesh;
mod ray;
pub mod reduce;
mod result;

#[cfg(all(feature = "gpu", not(target_arch = "wasm32")))]
pub mod gpu;

pub use cache::{raycast, GeometryCache};
pub use config::{RaycastConfig, DET_EPSILON, MISS_DISTANCE};
pub use debug::{DebugPrimitive, DebugSink, LogSink, NullSink, RecordingSink};
pub use dispatch::{
    group_count, ComputeBackend, ParallelBackend, SequentialBackend, TriangleHit, TriangleOutcome,
};
pub use error::{RaycastError, Result};
pub use kernel::{intersect_triangle, TriangleIntersection};
pub use mesh::{MeshGeometry, MeshSource, Triangle, TriangleMesh};
pub use ray::Ray;
pub use result::{MeshRaycastResult, RayHit};

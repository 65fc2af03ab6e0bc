//! Execution strategies that apply the kernel to every triangle.
//!
//! All strategies implement [`ComputeBackend`] and share
//! [`intersect_triangle`](crate::kernel::intersect_triangle), so they differ
//! only in scheduling:
//!
//! - [`SequentialBackend`] / [`sequential::trace`] - index order, one thread,
//!   optional debug drawing
//! - [`ParallelBackend`] - rayon work groups over the outcome array
//! - `gpu::GpuBackend` - wgpu compute shader (feature `gpu`)

pub mod parallel;
pub mod sequential;

use std::sync::Arc;

use meshcast_math::{Point3, Vec3};

use crate::error::Result;
use crate::kernel::TriangleIntersection;
use crate::{MeshGeometry, Ray, RaycastConfig};

pub use parallel::ParallelBackend;
pub use sequential::SequentialBackend;

/// Result slot for one triangle.
///
/// A miss is encoded as a large distance rather than an `Option` so the
/// outcome array stays plain numbers on every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleOutcome {
    /// Hit distance, or the miss sentinel.
    pub distance: f64,
    /// Unit normal of the hit triangle, zero on a miss.
    pub normal: Vec3,
}

impl TriangleOutcome {
    /// A hit at `distance`.
    pub fn hit(distance: f64, normal: Vec3) -> Self {
        Self { distance, normal }
    }

    /// A miss carrying the sentinel distance.
    pub fn miss(miss_distance: f64) -> Self {
        Self {
            distance: miss_distance,
            normal: Vec3::zeros(),
        }
    }

    /// Encode a kernel result.
    #[inline]
    pub fn from_intersection(hit: Option<TriangleIntersection>, miss_distance: f64) -> Self {
        match hit {
            Some(hit) => Self::hit(hit.distance, hit.normal),
            None => Self::miss(miss_distance),
        }
    }

    /// Whether this slot holds a usable hit.
    pub fn is_hit(&self, miss_distance: f64) -> bool {
        self.distance < miss_distance
    }
}

/// A hit reported by the sequential tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Index of the triangle in the mesh.
    pub triangle: usize,
    /// Parameter along the ray.
    pub distance: f64,
    /// Unit normal of the triangle.
    pub normal: Vec3,
    /// World-space hit point.
    pub point: Point3,
}

/// Number of work groups to dispatch for `triangles` triangles.
///
/// Rounds up and adds one spare group, so trailing triangles are always
/// covered; surplus invocations find no triangle and do nothing.
pub fn group_count(triangles: usize, group_width: u32) -> u32 {
    let width = group_width.max(1) as usize;
    triangles.div_ceil(width) as u32 + 1
}

/// An execution strategy for the per-triangle kernel.
///
/// `stage` runs once per cache lifetime; `dispatch` runs once per query and
/// must not return until every outcome slot has been written.
pub trait ComputeBackend {
    /// Staged geometry and output storage owned by the cache.
    type Buffers;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Preferred number of triangles per work group.
    fn group_width(&self) -> u32;

    /// Stage `geometry` and allocate one outcome slot per triangle.
    fn stage(&self, geometry: Arc<MeshGeometry>, config: &RaycastConfig) -> Result<Self::Buffers>;

    /// Run the kernel for every triangle against `ray` and block until done.
    fn dispatch(&self, buffers: &mut Self::Buffers, ray: &Ray, groups: [u32; 3]) -> Result<()>;

    /// Outcomes of the last dispatch, indexed by triangle.
    fn outcomes<'a>(&self, buffers: &'a Self::Buffers) -> &'a [TriangleOutcome];
}

/// Host-side buffers shared by the CPU backends.
#[derive(Debug)]
pub struct CpuBuffers {
    pub(crate) geometry: Arc<MeshGeometry>,
    pub(crate) epsilon: f64,
    pub(crate) miss_distance: f64,
    pub(crate) outcomes: Vec<TriangleOutcome>,
}

impl CpuBuffers {
    pub(crate) fn new(geometry: Arc<MeshGeometry>, config: &RaycastConfig) -> Self {
        let outcomes = vec![TriangleOutcome::miss(config.miss_distance); geometry.triangle_count()];
        Self {
            geometry,
            epsilon: config.epsilon,
            miss_distance: config.miss_distance,
            outcomes,
        }
    }
}

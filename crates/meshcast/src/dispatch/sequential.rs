//! Single-threaded tracing in triangle order.

use std::sync::Arc;

use crate::debug::{DebugSink, NullSink};
use crate::dispatch::{ComputeBackend, CpuBuffers, TriangleHit, TriangleOutcome};
use crate::error::Result;
use crate::kernel::intersect_triangle;
use crate::{MeshGeometry, Ray, RaycastConfig};

/// Trace `ray` against every triangle in index order, reporting every hit.
///
/// The sink receives the ray once, then per triangle its three vertices,
/// both edge vectors and the closing `v1 -> v2` segment before the kernel
/// runs, and the hit point afterwards if there is one.
pub fn trace(
    ray: &Ray,
    geometry: &MeshGeometry,
    epsilon: f64,
    sink: &mut dyn DebugSink,
) -> Vec<TriangleHit> {
    sink.ray(ray.origin, ray.direction);

    let mut hits = Vec::new();
    for (index, tri) in geometry.triangles().enumerate() {
        sink.vertex(tri.v0);
        sink.vertex(tri.v1);
        sink.vertex(tri.v2);

        let (e1, e2) = tri.edges();
        sink.edge(tri.v0, e1);
        sink.edge(tri.v0, e2);
        sink.line(tri.v1, tri.v2);

        if let Some(hit) = intersect_triangle(ray, &tri, epsilon) {
            let point = ray.at(hit.distance);
            sink.hit(point);
            hits.push(TriangleHit {
                triangle: index,
                distance: hit.distance,
                normal: hit.normal,
                point,
            });
        }
    }
    hits
}

/// [`trace`] behind the [`ComputeBackend`] interface, without drawing.
///
/// Each triangle is its own group and groups run strictly in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl ComputeBackend for SequentialBackend {
    type Buffers = CpuBuffers;

    fn name(&self) -> &'static str {
        "sequential"
    }

    fn group_width(&self) -> u32 {
        1
    }

    fn stage(&self, geometry: Arc<MeshGeometry>, config: &RaycastConfig) -> Result<CpuBuffers> {
        Ok(CpuBuffers::new(geometry, config))
    }

    fn dispatch(&self, buffers: &mut CpuBuffers, ray: &Ray, _groups: [u32; 3]) -> Result<()> {
        let miss = TriangleOutcome::miss(buffers.miss_distance);
        buffers.outcomes.fill(miss);
        for hit in trace(ray, &buffers.geometry, buffers.epsilon, &mut NullSink) {
            buffers.outcomes[hit.triangle] = TriangleOutcome::hit(hit.distance, hit.normal);
        }
        Ok(())
    }

    fn outcomes<'a>(&self, buffers: &'a CpuBuffers) -> &'a [TriangleOutcome] {
        &buffers.outcomes
    }
}

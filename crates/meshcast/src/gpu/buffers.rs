//! Device buffers staged for one mesh.

use bytemuck::{Pod, Zeroable};

use crate::dispatch::TriangleOutcome;
use crate::{MeshGeometry, Ray};

/// Per-dispatch uniform block, matching `Params` in the WGSL program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuParams {
    /// Ray origin (w unused).
    pub ray_origin: [f32; 4],
    /// Ray direction (w unused).
    pub ray_direction: [f32; 4],
    /// Determinant threshold.
    pub epsilon: f32,
    /// Distance written for misses.
    pub miss_distance: f32,
    /// Number of valid triangles; surplus invocations exit early.
    pub triangle_count: u32,
    /// Padding.
    pub _pad: u32,
}

impl GpuParams {
    /// Uniform contents for `ray` against a staged mesh.
    pub fn new(ray: &Ray, epsilon: f32, miss_distance: f32, triangle_count: u32) -> Self {
        let o = ray.origin;
        let d = ray.direction;
        Self {
            ray_origin: [o.x as f32, o.y as f32, o.z as f32, 1.0],
            ray_direction: [d.x as f32, d.y as f32, d.z as f32, 0.0],
            epsilon,
            miss_distance,
            triangle_count,
            _pad: 0,
        }
    }
}

/// Buffers and bind group for one staged mesh.
///
/// Geometry buffers are written once at staging; only the uniform block
/// changes between dispatches.
pub struct GpuBuffers {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) triangle_buffer: wgpu::Buffer,
    pub(crate) hits_buffer: wgpu::Buffer,
    pub(crate) normals_buffer: wgpu::Buffer,
    pub(crate) params_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) triangle_count: usize,
    pub(crate) epsilon: f32,
    pub(crate) miss_distance: f32,
    pub(crate) outcomes: Vec<TriangleOutcome>,
}

impl GpuBuffers {
    /// Number of staged triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }
}

impl Drop for GpuBuffers {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        self.triangle_buffer.destroy();
        self.hits_buffer.destroy();
        self.normals_buffer.destroy();
        self.params_buffer.destroy();
    }
}

/// Flat `[x0, y0, z0, x1, ...]` positions, at least one vertex long so the
/// storage binding is never empty.
pub(crate) fn flatten_vertices(geometry: &MeshGeometry) -> Vec<f32> {
    let mut flat: Vec<f32> = geometry
        .vertices()
        .iter()
        .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
        .collect();
    if flat.is_empty() {
        flat.extend_from_slice(&[0.0; 3]);
    }
    flat
}

/// Triangle indices, padded to one triangle for the same reason.
pub(crate) fn flatten_indices(geometry: &MeshGeometry) -> Vec<u32> {
    if geometry.indices().is_empty() {
        vec![0; 3]
    } else {
        geometry.indices().to_vec()
    }
}

/// Pair the read-back arrays into outcomes.
pub(crate) fn decode_outcomes(hits: &[f32], normals: &[f32], out: &mut Vec<TriangleOutcome>) {
    out.clear();
    out.extend(hits.iter().zip(normals.chunks_exact(3)).map(|(&distance, n)| {
        TriangleOutcome::hit(
            distance as f64,
            meshcast_math::Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64),
        )
    }));
}

//! Data-parallel dispatch on the CPU with rayon.

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::DEFAULT_GROUP_WIDTH;
use crate::dispatch::{ComputeBackend, CpuBuffers, TriangleOutcome};
use crate::error::{RaycastError, Result};
use crate::kernel::intersect_triangle;
use crate::{MeshGeometry, Ray, RaycastConfig};

/// Runs work groups of `group_width` triangles on the rayon thread pool.
///
/// Each group owns a disjoint chunk of the outcome array, so groups never
/// see each other's results. `dispatch` returns once every group is done.
#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    group_width: u32,
}

impl ParallelBackend {
    /// Backend with the given work-group width (clamped to at least one).
    pub fn new(group_width: u32) -> Self {
        Self {
            group_width: group_width.max(1),
        }
    }

    /// Backend sized from `config.group_width`.
    pub fn from_config(config: &RaycastConfig) -> Self {
        Self::new(config.group_width)
    }
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_WIDTH)
    }
}

impl ComputeBackend for ParallelBackend {
    type Buffers = CpuBuffers;

    fn name(&self) -> &'static str {
        "parallel"
    }

    fn group_width(&self) -> u32 {
        self.group_width
    }

    fn stage(&self, geometry: Arc<MeshGeometry>, config: &RaycastConfig) -> Result<CpuBuffers> {
        Ok(CpuBuffers::new(geometry, config))
    }

    fn dispatch(&self, buffers: &mut CpuBuffers, ray: &Ray, groups: [u32; 3]) -> Result<()> {
        let width = self.group_width as usize;
        let invocations = groups.iter().map(|&g| g as usize).product::<usize>() * width;
        if invocations < buffers.outcomes.len() {
            return Err(RaycastError::Backend {
                backend: self.name(),
                message: format!(
                    "{groups:?} groups of {width} cover {invocations} of {} triangles",
                    buffers.outcomes.len()
                ),
            });
        }

        let geometry: &MeshGeometry = &buffers.geometry;
        let (epsilon, miss_distance) = (buffers.epsilon, buffers.miss_distance);

        buffers
            .outcomes
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(group, slots)| {
                let first = group * width;
                for (offset, slot) in slots.iter_mut().enumerate() {
                    let tri = geometry.triangle(first + offset);
                    *slot = TriangleOutcome::from_intersection(
                        intersect_triangle(ray, &tri, epsilon),
                        miss_distance,
                    );
                }
            });

        Ok(())
    }

    fn outcomes<'a>(&self, buffers: &'a CpuBuffers) -> &'a [TriangleOutcome] {
        &buffers.outcomes
    }
}

//! wgpu compute pipeline for mesh ray casting.

use std::sync::Arc;

use meshcast_gpu::{read_buffer, GpuContext, GpuError};
use wgpu::util::DeviceExt;

use super::buffers::{decode_outcomes, flatten_indices, flatten_vertices, GpuBuffers, GpuParams};
use super::shaders::{ENTRY_POINT, MESH_RAYCAST_SHADER, WORKGROUP_WIDTH};
use crate::dispatch::{ComputeBackend, TriangleOutcome};
use crate::error::{RaycastError, Result};
use crate::{MeshGeometry, Ray, RaycastConfig};

/// Runs the kernel as a wgpu compute shader, one invocation per triangle.
pub struct GpuBackend {
    ctx: Arc<GpuContext>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GpuBackend {
    /// Compile the built-in program on `ctx`.
    pub fn new(ctx: Arc<GpuContext>) -> std::result::Result<Self, GpuError> {
        Self::with_program(ctx, MESH_RAYCAST_SHADER)
    }

    /// Compile a custom WGSL program with the same bindings and entry point
    /// as the built-in one. Fails if the program does not validate.
    pub fn with_program(ctx: Arc<GpuContext>, source: &str) -> std::result::Result<Self, GpuError> {
        let shader_module = ctx.create_shader_checked("Mesh Raycast Shader", source)?;

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Raycast Bind Group Layout"),
            entries: &[
                // Vertices
                storage_entry(0, true),
                // Triangle indices
                storage_entry(1, true),
                // Hit distances
                storage_entry(2, false),
                // Hit normals
                storage_entry(3, false),
                // Ray + constants
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Raycast Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = ctx.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Mesh Raycast Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader_module,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            ctx,
            pipeline,
            bind_group_layout,
        })
    }

    /// The device this backend runs on.
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }
}

impl ComputeBackend for GpuBackend {
    type Buffers = GpuBuffers;

    fn name(&self) -> &'static str {
        "gpu"
    }

    fn group_width(&self) -> u32 {
        WORKGROUP_WIDTH
    }

    fn stage(&self, geometry: Arc<MeshGeometry>, config: &RaycastConfig) -> Result<GpuBuffers> {
        let device = &self.ctx.device;
        let triangle_count = geometry.triangle_count();
        let slots = triangle_count.max(1) as u64;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&flatten_vertices(&geometry)),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Buffer"),
            contents: bytemuck::cast_slice(&flatten_indices(&geometry)),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let hits_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Hit Distance Buffer"),
            size: slots * std::mem::size_of::<f32>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let normals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Hit Normal Buffer"),
            size: slots * 3 * std::mem::size_of::<f32>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Params Buffer"),
            size: std::mem::size_of::<GpuParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Raycast Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: triangle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: hits_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: normals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Ok(GpuBuffers {
            vertex_buffer,
            triangle_buffer,
            hits_buffer,
            normals_buffer,
            params_buffer,
            bind_group,
            triangle_count,
            epsilon: config.epsilon as f32,
            miss_distance: config.miss_distance as f32,
            outcomes: vec![TriangleOutcome::miss(config.miss_distance); triangle_count],
        })
    }

    fn dispatch(&self, buffers: &mut GpuBuffers, ray: &Ray, groups: [u32; 3]) -> Result<()> {
        let max_groups = self.ctx.device.limits().max_compute_workgroups_per_dimension;
        if groups.iter().any(|&g| g > max_groups) {
            return Err(RaycastError::Backend {
                backend: self.name(),
                message: format!("{groups:?} work groups exceed the device limit of {max_groups}"),
            });
        }

        let params = GpuParams::new(
            ray,
            buffers.epsilon,
            buffers.miss_distance,
            buffers.triangle_count as u32,
        );
        self.ctx
            .queue
            .write_buffer(&buffers.params_buffer, 0, bytemuck::bytes_of(&params));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Raycast Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Mesh Raycast Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &buffers.bind_group, &[]);
            pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
        }
        self.ctx.queue.submit(Some(encoder.finish()));

        // Each readback waits on the device, so both arrays are complete.
        let n = buffers.triangle_count;
        let hits: Vec<f32> = read_buffer(&self.ctx, &buffers.hits_buffer, n)?;
        let normals: Vec<f32> = read_buffer(&self.ctx, &buffers.normals_buffer, n * 3)?;
        log::trace!("gpu hit distances {hits:?}");
        log::trace!("gpu hit normals {normals:?}");
        decode_outcomes(&hits, &normals, &mut buffers.outcomes);

        Ok(())
    }

    fn outcomes<'a>(&self, buffers: &'a GpuBuffers) -> &'a [TriangleOutcome] {
        &buffers.outcomes
    }
}

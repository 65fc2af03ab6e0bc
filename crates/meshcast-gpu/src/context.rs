//! GPU context management for wgpu device and queue.

use thiserror::Error;
use wgpu::{Device, Instance, Queue};

/// Errors that can occur during GPU operations.
#[derive(Debug, Error)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device.
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The kernel program failed validation.
    #[error("Shader `{label}` failed to compile: {message}")]
    ShaderCompile {
        /// Debug label of the shader module.
        label: String,
        /// Validation message reported by wgpu.
        message: String,
    },

    /// Buffer mapping failed.
    #[error("Buffer mapping failed")]
    BufferMapping,
}

/// A wgpu device and its queue.
///
/// Owned by whoever creates it. Share it behind an `Arc` when several
/// kernels run on the same device.
pub struct GpuContext {
    /// The wgpu device for creating resources and pipelines.
    pub device: Device,
    /// The command queue for submitting work.
    pub queue: Queue,
}

impl GpuContext {
    /// Request a high-performance adapter and open a device on it.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::debug!("using GPU adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        Ok(Self { device, queue })
    }

    /// Create the context synchronously (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }

    /// Compile a WGSL module, turning validation failures into an error
    /// instead of a device-lost panic later on.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn create_shader_checked(
        &self,
        label: &str,
        source: &str,
    ) -> Result<wgpu::ShaderModule, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(GpuError::ShaderCompile {
                label: label.to_string(),
                message: err.to_string(),
            }),
            None => Ok(module),
        }
    }
}

//! GPU dispatch using a wgpu compute shader.
//!
//! The shader runs one invocation per triangle and writes distance and
//! normal slots; the host reads both arrays back and reduces them with the
//! same [`reduce`](crate::reduce) code the CPU backends use. Coordinates are
//! `f32` on the device, so distances agree with the CPU backends to single
//! precision.

mod buffers;
mod pipeline;
pub mod shaders;

pub use buffers::{GpuBuffers, GpuParams};
pub use meshcast_gpu::{GpuContext, GpuError};
pub use pipeline::GpuBackend;

//! wgpu device management for meshcast.
//!
//! This crate owns the pieces every meshcast compute kernel needs:
//! - an explicitly owned device/queue pair ([`GpuContext`])
//! - validated shader compilation
//! - blocking storage-buffer readback

#![warn(missing_docs)]

mod context;
mod readback;

pub use context::{GpuContext, GpuError};
pub use readback::read_buffer;

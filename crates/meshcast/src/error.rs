//! Error types for ray casting.

use thiserror::Error;

/// Errors that can occur while staging geometry or dispatching a query.
#[derive(Error, Debug)]
pub enum RaycastError {
    /// Index buffer length is not a multiple of three.
    #[error("invalid mesh: {0} indices is not a whole number of triangles")]
    InvalidMesh(usize),

    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Triangle whose index triple is bad.
        triangle: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The execution backend could not stage or run the kernel.
    #[error("backend `{backend}` failed: {message}")]
    Backend {
        /// Backend name.
        backend: &'static str,
        /// What went wrong.
        message: String,
    },

    /// GPU device or kernel program unavailable.
    #[cfg(feature = "gpu")]
    #[error(transparent)]
    Gpu(#[from] meshcast_gpu::GpuError),

    /// A configuration value is out of range.
    #[error("invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        /// Offending key.
        field: &'static str,
        /// Value that was rejected.
        value: f64,
        /// Accepted range.
        reason: &'static str,
    },

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for ray casting operations.
pub type Result<T> = std::result::Result<T, RaycastError>;

//! WGSL programs for mesh ray casting.

/// The per-triangle intersection compute shader.
pub const MESH_RAYCAST_SHADER: &str = include_str!("mesh_raycast.wgsl");

/// `@workgroup_size` declared by [`MESH_RAYCAST_SHADER`].
pub const WORKGROUP_WIDTH: u32 = 64;

/// Entry point of [`MESH_RAYCAST_SHADER`].
pub const ENTRY_POINT: &str = "main";

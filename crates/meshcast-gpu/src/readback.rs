//! Blocking copy of a storage buffer back to host memory.

use bytemuck::Pod;

use crate::context::{GpuContext, GpuError};

/// Copy the first `len` elements of `source` into a host `Vec`.
///
/// `source` must have been created with `COPY_SRC`. The call submits a copy
/// into a temporary staging buffer and waits for the device to finish.
pub fn read_buffer<T: Pod>(
    ctx: &GpuContext,
    source: &wgpu::Buffer,
    len: usize,
) -> Result<Vec<T>, GpuError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let size = (len * std::mem::size_of::<T>()) as u64;

    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    ctx.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| GpuError::BufferMapping)?
        .map_err(|_| GpuError::BufferMapping)?;

    let data = slice.get_mapped_range();
    let values = bytemuck::cast_slice::<u8, T>(&data).to_vec();
    drop(data);
    staging.unmap();

    Ok(values)
}

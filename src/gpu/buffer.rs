//! Buffer abstraction for partial scene uploads.

/// The slice of graphics-API buffer functionality this layer needs: a fixed
/// capacity decided at allocation and partial writes (`glNamedBufferSubData`
/// and friends). Implementations never grow; an edit re-writes the record's
/// byte range in place.
///
/// Only the owning (graphics) thread may touch an implementation backed by a
/// real GPU object; the GPU pipeline's own command ordering synchronizes reads.
pub trait GpuBuffer {
    /// Allocated size in bytes, fixed for the buffer's lifetime.
    fn capacity(&self) -> usize;

    /// Writes `bytes` at `offset`. Writing past `capacity()` is a programming
    /// error on the caller's side.
    fn sub_data(&mut self, offset: usize, bytes: &[u8]);
}

/// `Vec<u8>`-backed buffer: the implementation used by tests and headless
/// runs, and a convenient CPU mirror for readback assertions.
#[derive(Debug, Clone)]
pub struct CpuStagingBuffer {
    bytes: Vec<u8>,
}

impl CpuStagingBuffer {
    /// Allocates `capacity` zeroed bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl GpuBuffer for CpuStagingBuffer {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn sub_data(&mut self, offset: usize, bytes: &[u8]) {
        debug_assert!(
            offset + bytes.len() <= self.bytes.len(),
            "sub_data write of {} bytes at {} exceeds capacity {}",
            bytes.len(),
            offset,
            self.bytes.len()
        );
        // Truncate rather than panic in release; a real GPU backend would
        // exhibit undefined contents here, the staging buffer stays memory-safe.
        let end = usize::min(offset + bytes.len(), self.bytes.len());
        if offset < end {
            self.bytes[offset..end].copy_from_slice(&bytes[..end - offset]);
        }
    }
}

//! Host-only backend for tests and GPU-free operation
//!
//! No GPU interaction: chunks come from `std::alloc` and "importing" a
//! range just hands the host pointer back as the device pointer. Every
//! operation is counted, so tests can observe how often the layout core
//! actually called into the collaborator (the idempotent-binding property
//! depends on this).

use std::alloc::Layout;
use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{
    BackendError, BackendResult, ChunkOwner, DeviceBackend, DeviceBuffer, HostChunk,
};

/// Default alignment of chunk base addresses handed out by [`HostBackend`].
///
/// Deliberately smaller than the default field alignment so that binding
/// against a host chunk actually exercises the re-alignment arithmetic.
const DEFAULT_CHUNK_ALIGN: usize = 16;

/// Call statistics for a [`HostBackend`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostBackendStats {
    /// Number of successful `allocate_chunk` calls
    pub alloc_count: usize,
    /// Number of successful `import` calls
    pub import_count: usize,
    /// Total bytes allocated
    pub allocated_bytes: usize,
    /// Total bytes imported
    pub imported_bytes: usize,
}

/// Host backend: allocates ordinary heap memory and imports by identity.
#[derive(Debug)]
pub struct HostBackend {
    chunk_align: usize,
    alloc_count: AtomicUsize,
    import_count: AtomicUsize,
    allocated_bytes: AtomicUsize,
    imported_bytes: AtomicUsize,
}

impl HostBackend {
    /// Backend with the default chunk base alignment.
    pub fn new() -> Self {
        Self::with_chunk_align(DEFAULT_CHUNK_ALIGN)
    }

    /// Backend whose chunk base addresses satisfy `align`.
    ///
    /// Tests that need real offsets to equal planned offsets pass the
    /// layout's largest field alignment here.
    pub fn with_chunk_align(align: usize) -> Self {
        Self {
            chunk_align: align,
            alloc_count: AtomicUsize::new(0),
            import_count: AtomicUsize::new(0),
            allocated_bytes: AtomicUsize::new(0),
            imported_bytes: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> HostBackendStats {
        HostBackendStats {
            alloc_count: self.alloc_count.load(Ordering::Relaxed),
            import_count: self.import_count.load(Ordering::Relaxed),
            allocated_bytes: self.allocated_bytes.load(Ordering::Relaxed),
            imported_bytes: self.imported_bytes.load(Ordering::Relaxed),
        }
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBackend for HostBackend {
    fn allocate_chunk(&self, len: usize) -> BackendResult<HostChunk> {
        if len == 0 {
            return Err(BackendError::AllocationFailed(
                "chunk length cannot be zero".to_string(),
            ));
        }
        let layout = Layout::from_size_align(len, self.chunk_align).map_err(|e| {
            BackendError::AllocationFailed(format!(
                "invalid chunk layout ({} bytes, align {}): {}",
                len, self.chunk_align, e
            ))
        })?;

        // Zeroed so a fresh chunk reads as zeroes before its first fill.
        // SAFETY: layout has non-zero size, checked above.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(BackendError::AllocationFailed(format!(
                "host allocation returned null for {} bytes",
                len
            )));
        }

        self.alloc_count.fetch_add(1, Ordering::Relaxed);
        self.allocated_bytes.fetch_add(len, Ordering::Relaxed);
        tracing::debug!("allocated {} byte host chunk at {:p}", len, ptr);

        Ok(HostChunk::from_raw_parts(ptr, len, ChunkOwner::Host(layout)))
    }

    fn import(&self, ptr: *mut c_void, len: usize) -> BackendResult<DeviceBuffer> {
        if ptr.is_null() {
            return Err(BackendError::ImportFailed(
                "cannot import a null pointer".to_string(),
            ));
        }
        if len == 0 {
            return Err(BackendError::ImportFailed(
                "cannot import an empty range".to_string(),
            ));
        }

        self.import_count.fetch_add(1, Ordering::Relaxed);
        self.imported_bytes.fetch_add(len, Ordering::Relaxed);
        tracing::trace!("imported {} bytes at {:p}", len, ptr);

        // Host memory is its own device memory here.
        Ok(DeviceBuffer::from_raw_parts(ptr, len))
    }

    fn synchronize(&self) -> BackendResult<()> {
        // Nothing to order: host reads and writes are already coherent.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let backend = HostBackend::new();
        let chunk = backend.allocate_chunk(1024).unwrap();
        assert_eq!(chunk.len(), 1024);
        assert!(!chunk.as_ptr().is_null());
        assert_eq!(chunk.as_ptr() as usize % DEFAULT_CHUNK_ALIGN, 0);

        let stats = backend.stats();
        assert_eq!(stats.alloc_count, 1);
        assert_eq!(stats.allocated_bytes, 1024);
    }

    #[test]
    fn test_chunk_contents_start_zeroed() {
        let backend = HostBackend::new();
        let chunk = backend.allocate_chunk(64).unwrap();
        // SAFETY: chunk is alive and 64 bytes long.
        let bytes = unsafe { std::slice::from_raw_parts(chunk.as_ptr(), 64) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_length_chunk_rejected() {
        let backend = HostBackend::new();
        assert!(matches!(
            backend.allocate_chunk(0),
            Err(BackendError::AllocationFailed(_))
        ));
        assert_eq!(backend.stats().alloc_count, 0);
    }

    #[test]
    fn test_custom_chunk_alignment() {
        let backend = HostBackend::with_chunk_align(256);
        let chunk = backend.allocate_chunk(512).unwrap();
        assert_eq!(chunk.as_ptr() as usize % 256, 0);
    }

    #[test]
    fn test_import_counts_successes_only() {
        let backend = HostBackend::new();
        let chunk = backend.allocate_chunk(64).unwrap();

        assert!(backend.import(std::ptr::null_mut(), 64).is_err());
        assert!(backend.import(chunk.as_ptr() as *mut c_void, 0).is_err());
        assert_eq!(backend.stats().import_count, 0);

        let buf = backend
            .import(chunk.as_ptr() as *mut c_void, 64)
            .unwrap();
        assert_eq!(buf.device_ptr(), chunk.as_ptr() as *mut c_void);
        assert_eq!(buf.len(), 64);
        assert_eq!(backend.stats().import_count, 1);
        assert_eq!(backend.stats().imported_bytes, 64);
    }

    #[test]
    fn test_synchronize_is_a_no_op() {
        let backend = HostBackend::new();
        assert!(backend.synchronize().is_ok());
    }
}

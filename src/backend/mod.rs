//! Device backend seam
//!
//! The layout core consumes exactly two collaborator capabilities:
//! allocate a chunk of device-visible, host-mappable memory, and import a
//! host-visible range as an opaque device buffer without copying. The
//! [`DeviceBackend`] trait is that seam; [`HostBackend`] implements it
//! without touching a GPU, and [`HipBackend`] (feature `rocm`) implements
//! it against the ROCm HIP runtime.

pub mod host;

#[cfg(feature = "rocm")]
pub mod ffi;
#[cfg(feature = "rocm")]
pub mod hip;

pub use host::{HostBackend, HostBackendStats};

#[cfg(feature = "rocm")]
pub use hip::HipBackend;

use std::alloc::Layout;
use std::ffi::c_void;
use std::sync::Arc;

use thiserror::Error;

/// Backend error types
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// Chunk allocation failed (out of memory, zero size, runtime error)
    #[error("chunk allocation failed: {0}")]
    AllocationFailed(String),
    /// The backend rejected a pointer/size pair offered for import
    #[error("device import failed: {0}")]
    ImportFailed(String),
    /// Device runtime error outside allocation and import
    #[error("device error: {0}")]
    DeviceError(String),
}

/// Backend result type
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The external compute collaborator.
///
/// Implementations own device/runtime state; the layout core only ever
/// calls these three operations.
pub trait DeviceBackend {
    /// Allocate at least `len` bytes of contiguous, byte-addressable,
    /// device-visible and host-mappable memory.
    ///
    /// The returned [`HostChunk`] owns the allocation; the layout core
    /// only computes offsets into it.
    fn allocate_chunk(&self, len: usize) -> BackendResult<HostChunk>;

    /// Register `len` bytes at `ptr` as a device buffer, without copying.
    ///
    /// The backing memory stays owned by its chunk; the returned handle is
    /// only a device-side identity for it.
    fn import(&self, ptr: *mut c_void, len: usize) -> BackendResult<DeviceBuffer>;

    /// Host/device visibility bracket.
    ///
    /// Callers invoke this between host-side writes and device-side reads
    /// (and vice versa); what it does is entirely the backend's business.
    fn synchronize(&self) -> BackendResult<()>;
}

/// How a chunk's memory was obtained, and therefore how it is freed.
#[derive(Debug)]
pub(crate) enum ChunkOwner {
    /// `std::alloc` allocation, freed with the stored layout.
    Host(Layout),
    /// Pinned allocation from `hipHostMalloc`, freed with `hipHostFree`.
    #[cfg(feature = "rocm")]
    Pinned,
}

/// An owned chunk of host-mappable memory, allocated by a backend.
///
/// Arc-backed so the owner can be cloned cheaply and shared with whatever
/// is driving the binding pass; the underlying memory is freed exactly
/// once, when the last clone drops.
#[derive(Debug, Clone)]
pub struct HostChunk {
    inner: Arc<HostChunkInner>,
}

#[derive(Debug)]
struct HostChunkInner {
    ptr: *mut u8,
    len: usize,
    owner: ChunkOwner,
}

// SAFETY: HostChunk only carries the raw base pointer; access sequencing
// is the caller's contract (one bind pass at a time over a given region).
unsafe impl Send for HostChunk {}
unsafe impl Sync for HostChunk {}

impl HostChunk {
    pub(crate) fn from_raw_parts(ptr: *mut u8, len: usize, owner: ChunkOwner) -> Self {
        Self {
            inner: Arc::new(HostChunkInner { ptr, len, owner }),
        }
    }

    /// Base address of the chunk.
    pub fn as_ptr(&self) -> *mut u8 {
        self.inner.ptr
    }

    /// Chunk size in bytes.
    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// A fresh cursor over the whole chunk.
    pub fn cursor(&self) -> crate::layout::ChunkCursor {
        crate::layout::ChunkCursor::new(self)
    }
}

impl Drop for HostChunkInner {
    fn drop(&mut self) {
        match &self.owner {
            ChunkOwner::Host(layout) => {
                // SAFETY: ptr came from std::alloc with this exact layout
                // and is freed only here.
                unsafe { std::alloc::dealloc(self.ptr, *layout) }
            }
            #[cfg(feature = "rocm")]
            ChunkOwner::Pinned => {
                // SAFETY: ptr came from hipHostMalloc.
                unsafe {
                    ffi::hipHostFree(self.ptr as *mut c_void);
                }
            }
        }
    }
}

/// Opaque device-side handle for an imported range.
///
/// Cheap to clone (Arc-backed). Holds no ownership of the backing memory;
/// the chunk the range was carved from must outlive any device-side use
/// of the handle.
#[derive(Debug, Clone)]
pub struct DeviceBuffer {
    inner: Arc<DeviceBufferInner>,
}

#[derive(Debug)]
struct DeviceBufferInner {
    device_ptr: *mut c_void,
    len: usize,
}

// SAFETY: the handle is an address plus a length; device-side access
// ordering is governed by the backend's synchronize operation.
unsafe impl Send for DeviceBuffer {}
unsafe impl Sync for DeviceBuffer {}

impl DeviceBuffer {
    pub(crate) fn from_raw_parts(device_ptr: *mut c_void, len: usize) -> Self {
        Self {
            inner: Arc::new(DeviceBufferInner { device_ptr, len }),
        }
    }

    /// Device-side address of the imported range.
    pub fn device_ptr(&self) -> *mut c_void {
        self.inner.device_ptr
    }

    /// Length of the imported range in bytes.
    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }
}

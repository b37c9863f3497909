//! ROCm HIP backend
//!
//! Chunks are pinned host allocations (`hipHostMalloc` with the mapped
//! flag), so every byte is simultaneously host-addressable and visible to
//! the device. Importing a sub-range resolves its device-side address with
//! `hipHostGetDevicePointer`; no bytes move.

use std::ffi::c_void;
use std::ptr;

use crate::backend::ffi;
use crate::backend::{
    BackendError, BackendResult, ChunkOwner, DeviceBackend, DeviceBuffer, HostChunk,
};

/// Render a HIP status code with the runtime's own error string.
fn hip_error_string(code: i32) -> String {
    // SAFETY: hipGetErrorString returns a pointer to a static string for
    // every status code, including unknown ones.
    let msg = unsafe {
        let raw = ffi::hipGetErrorString(code);
        if raw.is_null() {
            return format!("code {}", code);
        }
        std::ffi::CStr::from_ptr(raw).to_string_lossy().into_owned()
    };
    format!("{} (code {})", msg, code)
}

/// HIP-backed device collaborator.
#[derive(Debug)]
pub struct HipBackend {
    device_id: i32,
}

impl HipBackend {
    /// Initialize the HIP runtime and select `device_id`.
    pub fn new(device_id: i32) -> BackendResult<Self> {
        let result = unsafe { ffi::hipInit(0) };
        if result != ffi::HIP_SUCCESS {
            return Err(BackendError::DeviceError(format!(
                "hipInit failed: {}",
                hip_error_string(result)
            )));
        }

        let result = unsafe { ffi::hipSetDevice(device_id) };
        if result != ffi::HIP_SUCCESS {
            return Err(BackendError::DeviceError(format!(
                "hipSetDevice({}) failed: {}",
                device_id,
                hip_error_string(result)
            )));
        }

        tracing::info!("HIP backend initialized on device {}", device_id);
        Ok(Self { device_id })
    }

    /// Selected device ordinal.
    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    /// Whether at least one HIP device is present.
    ///
    /// Used by tests to skip gracefully on machines without a GPU.
    pub fn gpu_available() -> bool {
        let mut count: i32 = 0;
        let result = unsafe { ffi::hipGetDeviceCount(&mut count) };
        result == ffi::HIP_SUCCESS && count > 0
    }
}

impl DeviceBackend for HipBackend {
    fn allocate_chunk(&self, len: usize) -> BackendResult<HostChunk> {
        if len == 0 {
            return Err(BackendError::AllocationFailed(
                "chunk length cannot be zero".to_string(),
            ));
        }

        let mut ptr: *mut c_void = ptr::null_mut();
        let result = unsafe { ffi::hipHostMalloc(&mut ptr, len, ffi::HIP_HOST_MALLOC_MAPPED) };
        if result != ffi::HIP_SUCCESS {
            tracing::error!("hipHostMalloc failed for {} bytes", len);
            return Err(BackendError::AllocationFailed(format!(
                "hipHostMalloc failed for {} bytes: {}",
                len,
                hip_error_string(result)
            )));
        }
        if ptr.is_null() {
            return Err(BackendError::AllocationFailed(format!(
                "hipHostMalloc returned null pointer for {} bytes",
                len
            )));
        }

        tracing::debug!("allocated {} byte pinned chunk at {:p}", len, ptr);
        Ok(HostChunk::from_raw_parts(
            ptr as *mut u8,
            len,
            ChunkOwner::Pinned,
        ))
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

        let mut dev_ptr: *mut c_void = ptr::null_mut();
        let result = unsafe {
            ffi::hipHostGetDevicePointer(&mut dev_ptr, ptr, ffi::HIP_HOST_GET_DEVICE_POINTER_DEFAULT)
        };
        if result != ffi::HIP_SUCCESS {
            tracing::error!("device pointer lookup failed for host {:p}", ptr);
            return Err(BackendError::ImportFailed(format!(
                "hipHostGetDevicePointer failed (host ptr {:p}, {} bytes): {}",
                ptr,
                len,
                hip_error_string(result)
            )));
        }

        tracing::trace!("imported {} bytes: host {:p} -> device {:p}", len, ptr, dev_ptr);
        Ok(DeviceBuffer::from_raw_parts(dev_ptr, len))
    }

    fn synchronize(&self) -> BackendResult<()> {
        let result = unsafe { ffi::hipDeviceSynchronize() };
        if result != ffi::HIP_SUCCESS {
            return Err(BackendError::DeviceError(format!(
                "hipDeviceSynchronize failed: {}",
                hip_error_string(result)
            )));
        }
        Ok(())
    }
}

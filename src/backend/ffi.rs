//! HIP FFI bindings
//!
//! Declarations below are bound to the ROCm HIP runtime. All functions are
//! called through the safe wrappers in [`HipBackend`](super::HipBackend);
//! the dead_code allowance is needed because FFI symbols appear unused to
//! the compiler (they are only reached through unsafe blocks).

use std::ffi::c_void;

#[link(name = "amdhip64")]
#[allow(dead_code)]
extern "C" {
    pub fn hipInit(flags: u32) -> i32;
    pub fn hipGetDeviceCount(count: *mut i32) -> i32;
    pub fn hipSetDevice(deviceId: i32) -> i32;
    pub fn hipHostMalloc(ptr: *mut *mut c_void, size: usize, flags: u32) -> i32;
    pub fn hipHostFree(ptr: *mut c_void) -> i32;
    pub fn hipHostGetDevicePointer(
        devPtr: *mut *mut c_void,
        hostPtr: *mut c_void,
        flags: u32,
    ) -> i32;
    pub fn hipDeviceSynchronize() -> i32;
    pub fn hipGetErrorString(error: i32) -> *const i8;
}

/// HIP success code
pub const HIP_SUCCESS: i32 = 0;

/// Allocate pinned memory that is mapped into the device address space
pub const HIP_HOST_MALLOC_MAPPED: u32 = 0x2;

/// Default flags for `hipHostGetDevicePointer`
pub const HIP_HOST_GET_DEVICE_POINTER_DEFAULT: u32 = 0x0;

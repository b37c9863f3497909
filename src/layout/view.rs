//! Typed sub-views into a chunk, with lazy device binding

use std::mem;

use crate::backend::{BackendResult, DeviceBackend, DeviceBuffer};

/// A typed window into a chunk: pointer plus element count.
///
/// Sub-views hold no ownership; the chunk they were carved from must stay
/// alive for as long as the view is read or written. An unbound view is
/// valid for host-side access; device-side access requires
/// [`locate`](SubView::locate) first.
#[derive(Debug)]
pub struct SubView<T> {
    ptr: *mut T,
    len: usize,
    /// Latched device handle. `None` until the first successful `locate`;
    /// permanent afterwards.
    device: Option<DeviceBuffer>,
}

// SAFETY: SubView only contains a raw pointer into the externally owned
// chunk; the single-writer sequencing that makes the chunk safe to touch
// is the caller's contract, same as for the chunk itself.
unsafe impl<T: Send> Send for SubView<T> {}

impl<T> SubView<T> {
    pub(crate) fn from_raw(ptr: *mut T, len: usize) -> Self {
        Self {
            ptr,
            len,
            device: None,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte extent of the view.
    pub fn byte_len(&self) -> usize {
        self.len * mem::size_of::<T>()
    }

    /// Raw pointer to the first element.
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    /// Raw mutable pointer to the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr
    }

    /// Host-side read access to the elements.
    ///
    /// Valid only for views carved from a real chunk that is still alive;
    /// views from a dry-run cursor must not be dereferenced.
    pub fn as_slice(&self) -> &[T] {
        debug_assert!(!self.ptr.is_null(), "dereferencing a dry-run sub-view");
        // SAFETY: the cursor bounds-checked [ptr, ptr + len) against the
        // chunk before producing this view, and the chunk outlives the
        // view per the binding contract.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Host-side write access to the elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        debug_assert!(!self.ptr.is_null(), "dereferencing a dry-run sub-view");
        // SAFETY: same bounds and lifetime argument as `as_slice`; the
        // cursor never hands out overlapping views, so this is the only
        // mutable path to these bytes.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// Import this view as a device buffer, once.
    ///
    /// The first call registers `(ptr, byte_len)` with the backend without
    /// copying and latches the returned handle. Subsequent calls are
    /// no-ops that return the latched handle, regardless of which backend
    /// is passed - the binding is permanent for the view's lifetime.
    ///
    /// # Errors
    /// `ImportFailed` if the backend rejects the pointer/size pair. The
    /// view stays unbound and a later call may retry against a backend
    /// that accepts it.
    pub fn locate<B: DeviceBackend + ?Sized>(&mut self, backend: &B) -> BackendResult<DeviceBuffer> {
        if let Some(buf) = &self.device {
            tracing::trace!("sub-view at {:p} already located", self.ptr);
            return Ok(buf.clone());
        }
        let buf = backend.import(self.ptr.cast(), self.byte_len())?;
        self.device = Some(buf.clone());
        Ok(buf)
    }

    /// Whether the view has been imported as a device buffer.
    pub fn is_located(&self) -> bool {
        self.device.is_some()
    }

    /// The latched device handle, if any.
    pub fn device(&self) -> Option<&DeviceBuffer> {
        self.device.as_ref()
    }
}

//! SoaForge - structure-of-arrays sub-allocation for GPU compute
//!
//! Packs multiple differently-typed, differently-aligned arrays into one
//! externally-owned contiguous memory chunk, then lazily imports each
//! sub-array as a zero-copy device buffer.
//!
//! The workflow is two-phase:
//! 1. Plan: run the layout arithmetic against a null base address to size
//!    the allocation (no real buffer involved).
//! 2. Bind: walk a caller-supplied chunk with the identical arithmetic to
//!    produce typed sub-views, each of which can be registered with the
//!    device backend on first use.

pub mod backend;
pub mod error;
pub mod layout;
pub mod logging;

pub use backend::{
    BackendError, BackendResult, DeviceBackend, DeviceBuffer, HostBackend, HostChunk,
};
#[cfg(feature = "rocm")]
pub use backend::HipBackend;
pub use error::{ErrorCategory, ForgeResult, SoaForgeError};
pub use layout::{
    record_required_size, ChunkCursor, FieldSpec, LayoutError, LayoutPlanner, LayoutResult,
    SoaRecord, SubView,
};

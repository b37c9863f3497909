//! SOA layout planning and chunk binding
//!
//! This module implements the structure-of-arrays packing scheme: every
//! field occupies its own contiguous, alignment-respecting run inside one
//! shared chunk, instead of interleaving fields per record.
//!
//! # Pattern
//!
//! 1. Declare the fields (element type, count, alignment).
//! 2. Dry-run the layout against a null base address to size the chunk.
//! 3. Have the backend allocate that many bytes of device-visible memory.
//! 4. Bind: walk the real chunk with the identical arithmetic to carve
//!    typed sub-views.
//! 5. Lazily import each sub-view as a device buffer on first use.
//!
//! Both passes share one code path (a [`ChunkCursor`] walk), which is what
//! guarantees that planned offsets and bound offsets agree.

pub mod cursor;
pub mod field;
pub mod planner;
pub mod record;
pub mod view;

pub use cursor::{ChunkCursor, FieldSlot};
pub use field::{FieldSpec, DEFAULT_ALIGNMENT};
pub use planner::LayoutPlanner;
pub use record::{record_required_size, SoaRecord};
pub use view::SubView;

use thiserror::Error;

/// Layout error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A field descriptor is malformed or the layout exceeds the address space
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    /// The chunk is smaller than the layout requires
    #[error("insufficient chunk space: need {needed} bytes, {available} available")]
    AllocationTooSmall { needed: usize, available: usize },
}

/// Layout result type
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

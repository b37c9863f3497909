//! Layout planner: sizes a packed chunk before any allocation occurs
//!
//! The planner enables pre-flight sizing: declare every field, ask for the
//! required byte count, hand that to the backend's allocator, then bind.
//! Planning runs the binder's own arithmetic against a null base address,
//! so the sizes it reports are exactly what binding will consume.

use crate::layout::{ChunkCursor, FieldSpec, LayoutResult};

/// Accumulates field descriptors and computes the packed chunk size.
///
/// # Example
/// ```
/// use soaforge::layout::LayoutPlanner;
///
/// let mut planner = LayoutPlanner::new();
/// planner.add::<i32>(100);
/// planner.add::<u32>(100);
/// // 400 -> 512, 400 -> 512, plus the 128-byte margin
/// assert_eq!(planner.required_size().unwrap(), 1040);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutPlanner {
    fields: Vec<FieldSpec>,
}

impl LayoutPlanner {
    /// Create an empty planner.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field descriptor.
    pub fn push(&mut self, spec: FieldSpec) {
        self.fields.push(spec);
    }

    /// Append `count` elements of `T` at the default alignment.
    pub fn add<T>(&mut self, count: usize) {
        self.push(FieldSpec::of::<T>(count));
    }

    /// Append `count` elements of `T` at a caller-chosen alignment.
    pub fn add_with_align<T>(&mut self, count: usize, align: usize) {
        self.push(FieldSpec::with_align::<T>(count, align));
    }

    /// Number of fields declared.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The declared field descriptors, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total bytes the packed chunk must provide, margin included.
    ///
    /// Runs the binder against a null-base dry-run cursor; the result is
    /// the final cursor position plus the safety margin (the largest field
    /// alignment), which absorbs the forward shift when the real chunk's
    /// base address does not satisfy the first field's alignment.
    pub fn required_size(&self) -> LayoutResult<usize> {
        let mut cursor = ChunkCursor::dry_run();
        for spec in &self.fields {
            cursor.carve_field(spec)?;
        }
        let size = cursor.planned_size();
        tracing::debug!(
            "planned {} fields into {} bytes ({} byte margin)",
            self.fields.len(),
            size,
            cursor.max_align()
        );
        Ok(size)
    }

    /// The safety margin `required_size` adds on top of the packed extent.
    pub fn margin(&self) -> usize {
        self.fields.iter().map(|f| f.align()).max().unwrap_or(0)
    }

    /// Planned byte offset of each field, in declaration order.
    pub fn offsets(&self) -> LayoutResult<Vec<usize>> {
        let mut cursor = ChunkCursor::dry_run();
        self.fields
            .iter()
            .map(|spec| cursor.carve_field(spec).map(|slot| slot.offset))
            .collect()
    }

    /// Drop all declared fields (for reuse).
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

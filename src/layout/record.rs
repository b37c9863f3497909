//! Aggregate records: groups of fields laid out and bound as a unit

use crate::layout::{ChunkCursor, LayoutResult};

/// A named group of fields carved from a chunk in one pass.
///
/// Implementations carve their member views in declaration order; the
/// cursor does the rest. The same implementation drives both phases:
/// planning runs `from_chunk` against a dry-run cursor and discards the
/// record, binding runs it against the real chunk.
///
/// ```
/// use soaforge::layout::{ChunkCursor, LayoutResult, SoaRecord, SubView};
///
/// struct Pair {
///     ints: SubView<i32>,
///     uints: SubView<u32>,
/// }
///
/// impl SoaRecord for Pair {
///     type Params = usize;
///
///     fn from_chunk(cursor: &mut ChunkCursor, n: &usize) -> LayoutResult<Self> {
///         Ok(Pair {
///             ints: cursor.carve(*n)?,
///             uints: cursor.carve(*n)?,
///         })
///     }
/// }
/// ```
pub trait SoaRecord: Sized {
    /// Shape parameters the record needs to carve itself, typically the
    /// element count shared by its fields.
    type Params;

    /// Carve all member views from the cursor, in declaration order.
    fn from_chunk(cursor: &mut ChunkCursor, params: &Self::Params) -> LayoutResult<Self>;
}

/// Total bytes a record of type `R` requires, margin included.
///
/// Dry-runs `R::from_chunk` against a null-base cursor and discards the
/// resulting record; only the final cursor position and the margin
/// survive. Because this is the same code path `from_chunk` takes against
/// a real chunk, the size is exact rather than an estimate.
pub fn record_required_size<R: SoaRecord>(params: &R::Params) -> LayoutResult<usize> {
    let mut cursor = ChunkCursor::dry_run();
    let _ = R::from_chunk(&mut cursor, params)?;
    Ok(cursor.planned_size())
}

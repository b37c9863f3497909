//! Chunk cursor: sequential carving of typed fields out of a raw chunk
//!
//! The cursor is the single code path behind both layout passes. A dry-run
//! cursor starts at address zero with unbounded capacity and only records
//! offsets; a real cursor starts at the chunk's base address and also
//! produces live sub-views. Because both walk the same arithmetic, planned
//! offsets and bound offsets are guaranteed to agree.

use crate::backend::HostChunk;
use crate::layout::{FieldSpec, LayoutError, LayoutResult, SubView, DEFAULT_ALIGNMENT};

/// Round `n` up to the next multiple of `align`.
///
/// `align` must be a non-zero power of 2 (callers validate the spec first).
#[inline]
pub(crate) fn align_up(n: usize, align: usize) -> LayoutResult<usize> {
    debug_assert!(align != 0 && align.is_power_of_two());
    n.checked_add(align - 1)
        .map(|v| v & !(align - 1))
        .ok_or_else(|| {
            LayoutError::InvalidLayout(format!(
                "address overflow aligning {:#x} to {}",
                n, align
            ))
        })
}

/// One carved field: its byte offset from the cursor origin and its
/// element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// Byte offset of the field's first element, relative to where the
    /// cursor started.
    pub offset: usize,
    /// Number of elements.
    pub count: usize,
}

/// Mutating position over a chunk being carved into fields.
///
/// Each carve rounds the cursor up to the field's alignment, checks the
/// field fits the chunk, and advances past the field's byte extent, so
/// consecutive carves produce disjoint ranges in declaration order.
/// Repeated carves can interleave several aggregate records in one chunk,
/// and [`rewind`](ChunkCursor::rewind) restarts the walk at the chunk base
/// to re-derive the same offsets for a second logical view of the bytes.
///
/// # Safety contract
///
/// The chunk must stay alive for as long as any sub-view carved from it is
/// read or written. The cursor itself never dereferences the chunk; only
/// the host-access methods on [`SubView`] do.
#[derive(Debug)]
pub struct ChunkCursor {
    /// Address where this pass started
    origin: usize,
    /// Current address
    pos: usize,
    /// One past the last usable address (`usize::MAX` for a dry run)
    end: usize,
    /// Largest alignment any carved field requested
    max_align: usize,
}

impl ChunkCursor {
    /// Cursor over a backend-allocated chunk.
    pub fn new(chunk: &HostChunk) -> Self {
        Self::from_raw_parts(chunk.as_ptr(), chunk.len())
    }

    /// Cursor over an externally allocated byte range.
    ///
    /// Any allocator satisfying the raw-bytes contract is substitutable;
    /// `base` must point at `len` valid bytes.
    pub fn from_raw_parts(base: *mut u8, len: usize) -> Self {
        let origin = base as usize;
        Self {
            origin,
            pos: origin,
            end: origin.saturating_add(len),
            max_align: 0,
        }
    }

    /// Planning cursor: null base, unbounded capacity.
    ///
    /// Address 0 satisfies every power-of-two alignment, so the offsets a
    /// dry run produces are directly usable as an allocation layout.
    /// Sub-views carved from a dry-run cursor must not be dereferenced or
    /// located; they exist only to drive the offset arithmetic.
    pub fn dry_run() -> Self {
        Self {
            origin: 0,
            pos: 0,
            end: usize::MAX,
            max_align: 0,
        }
    }

    /// Carve the next field described by `spec`.
    ///
    /// Rounds the cursor up to `spec.align()`, verifies the field's byte
    /// extent fits the chunk using pure address arithmetic (no pointer is
    /// formed for a field that does not fit), and advances the cursor past
    /// the field.
    ///
    /// # Errors
    /// - `InvalidLayout` if the spec fails validation or the walk overflows
    ///   the address space
    /// - `AllocationTooSmall` if the field would extend past the chunk end
    pub fn carve_field(&mut self, spec: &FieldSpec) -> LayoutResult<FieldSlot> {
        spec.validate()?;
        let aligned = align_up(self.pos, spec.align())?;
        let extent = spec.byte_len()?;
        let field_end = aligned.checked_add(extent).ok_or_else(|| {
            LayoutError::InvalidLayout(format!(
                "address overflow carving field '{}'",
                spec.label()
            ))
        })?;
        if field_end > self.end {
            return Err(LayoutError::AllocationTooSmall {
                needed: field_end - self.origin,
                available: self.end - self.origin,
            });
        }

        self.max_align = self.max_align.max(spec.align());
        self.pos = field_end;

        let slot = FieldSlot {
            offset: aligned - self.origin,
            count: spec.count(),
        };
        tracing::trace!(
            "carved '{}' at offset {} ({} bytes, align {})",
            spec.label(),
            slot.offset,
            extent,
            spec.align()
        );
        Ok(slot)
    }

    /// Carve `count` elements of `T` at the default alignment.
    pub fn carve<T>(&mut self, count: usize) -> LayoutResult<SubView<T>> {
        self.carve_with_align(count, DEFAULT_ALIGNMENT)
    }

    /// Carve `count` elements of `T` at a caller-chosen alignment.
    pub fn carve_with_align<T>(&mut self, count: usize, align: usize) -> LayoutResult<SubView<T>> {
        let slot = self.carve_field(&FieldSpec::with_align::<T>(count, align))?;
        let ptr = (self.origin + slot.offset) as *mut T;
        Ok(SubView::from_raw(ptr, slot.count))
    }

    /// Bytes consumed from the origin, alignment padding included.
    pub fn position(&self) -> usize {
        self.pos - self.origin
    }

    /// Largest alignment any carved field requested so far.
    pub fn max_align(&self) -> usize {
        self.max_align
    }

    /// Total allocation size the fields carved so far require: the final
    /// cursor position plus the safety margin.
    ///
    /// The margin equals the largest field alignment seen. A real chunk's
    /// base address is not guaranteed to satisfy the first field's
    /// alignment (unlike the null base used while planning), which shifts
    /// every offset forward by up to `align - 1` bytes; the margin absorbs
    /// that worst case.
    pub fn planned_size(&self) -> usize {
        self.position() + self.max_align
    }

    /// Reset the cursor to the chunk base.
    ///
    /// A second pass over the same chunk re-derives the same offsets,
    /// yielding a logically independent view of the same bytes.
    pub fn rewind(&mut self) {
        self.pos = self.origin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 128-aligned scratch buffer so real-base offsets match dry-run offsets
    // exactly in the equivalence tests.
    struct AlignedBuf {
        _storage: Vec<u8>,
        base: *mut u8,
        len: usize,
    }

    impl AlignedBuf {
        fn new(len: usize) -> Self {
            let mut storage = vec![0u8; len + 128];
            let addr = storage.as_mut_ptr() as usize;
            let base = ((addr + 127) & !127) as *mut u8;
            Self {
                _storage: storage,
                base,
                len,
            }
        }

        fn cursor(&self) -> ChunkCursor {
            ChunkCursor::from_raw_parts(self.base, self.len)
        }
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 128).unwrap(), 0);
        assert_eq!(align_up(1, 128).unwrap(), 128);
        assert_eq!(align_up(127, 128).unwrap(), 128);
        assert_eq!(align_up(128, 128).unwrap(), 128);
        assert_eq!(align_up(129, 128).unwrap(), 256);
        assert_eq!(align_up(400, 128).unwrap(), 512);
        assert!(align_up(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_dry_run_offsets() {
        let mut cursor = ChunkCursor::dry_run();
        let a = cursor.carve_field(&FieldSpec::of::<i32>(100)).unwrap();
        let b = cursor.carve_field(&FieldSpec::of::<u32>(100)).unwrap();
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 512);
        assert_eq!(cursor.position(), 912);
        assert_eq!(cursor.max_align(), 128);
        assert_eq!(cursor.planned_size(), 1040);
    }

    #[test]
    fn test_real_offsets_match_dry_run_on_aligned_base() {
        let buf = AlignedBuf::new(1040);
        let mut real = buf.cursor();
        let mut dry = ChunkCursor::dry_run();

        let specs = [
            FieldSpec::of::<i32>(100),
            FieldSpec::with_align::<u64>(7, 64),
            FieldSpec::of::<u8>(33),
        ];
        for spec in &specs {
            let r = real.carve_field(spec).unwrap();
            let d = dry.carve_field(spec).unwrap();
            assert_eq!(r, d, "real and dry offsets diverged for '{}'", spec.label());
        }
        assert_eq!(real.position(), dry.position());
    }

    #[test]
    fn test_carved_views_are_aligned() {
        let buf = AlignedBuf::new(4096);
        let mut cursor = buf.cursor();
        let a = cursor.carve::<i32>(5).unwrap();
        let b = cursor.carve_with_align::<u64>(3, 256).unwrap();
        assert_eq!(a.as_ptr() as usize % 128, 0);
        assert_eq!(b.as_ptr() as usize % 256, 0);
    }

    #[test]
    fn test_fields_disjoint_and_ordered() {
        let buf = AlignedBuf::new(4096);
        let mut cursor = buf.cursor();
        let mut prev_end = 0usize;
        for spec in [
            FieldSpec::of::<i32>(17),
            FieldSpec::with_align::<u8>(3, 32),
            FieldSpec::of::<u64>(9),
        ] {
            let slot = cursor.carve_field(&spec).unwrap();
            assert!(slot.offset >= prev_end, "field overlaps its predecessor");
            prev_end = slot.offset + spec.byte_len().unwrap();
        }
    }

    #[test]
    fn test_deterministic_across_cursors() {
        let buf = AlignedBuf::new(2048);
        let specs = [FieldSpec::of::<i32>(100), FieldSpec::of::<u32>(100)];

        let mut first = buf.cursor();
        let mut second = buf.cursor();
        for spec in &specs {
            assert_eq!(
                first.carve_field(spec).unwrap(),
                second.carve_field(spec).unwrap()
            );
        }
    }

    #[test]
    fn test_rewind_rederives_offsets() {
        let buf = AlignedBuf::new(2048);
        let mut cursor = buf.cursor();
        let a = cursor.carve::<i32>(100).unwrap();
        let b = cursor.carve::<u32>(100).unwrap();

        cursor.rewind();
        let a2 = cursor.carve::<i32>(100).unwrap();
        let b2 = cursor.carve::<u32>(100).unwrap();
        assert_eq!(a.as_ptr(), a2.as_ptr());
        assert_eq!(b.as_ptr(), b2.as_ptr());
    }

    #[test]
    fn test_undersized_chunk_rejected() {
        let buf = AlignedBuf::new(900);
        let mut cursor = buf.cursor();
        cursor.carve::<i32>(100).unwrap();
        let err = cursor.carve::<u32>(100).unwrap_err();
        assert_eq!(
            err,
            LayoutError::AllocationTooSmall {
                needed: 912,
                available: 900,
            }
        );
    }

    #[test]
    fn test_rejected_field_does_not_advance_cursor() {
        let buf = AlignedBuf::new(512);
        let mut cursor = buf.cursor();
        let before = cursor.position();
        assert!(cursor.carve::<i32>(1000).is_err());
        assert_eq!(cursor.position(), before);
    }

    #[test]
    fn test_misaligned_base_stays_within_planned_size() {
        // Plan against a null base, then bind at base+1: the margin must
        // absorb the forward shift from re-aligning the first field.
        let mut dry = ChunkCursor::dry_run();
        let specs = [FieldSpec::of::<i32>(100), FieldSpec::of::<u32>(100)];
        for spec in &specs {
            dry.carve_field(spec).unwrap();
        }
        let planned = dry.planned_size();

        let buf = AlignedBuf::new(planned + 1);
        let misaligned = unsafe { buf.base.add(1) };
        let mut cursor = ChunkCursor::from_raw_parts(misaligned, planned);
        for spec in &specs {
            cursor.carve_field(spec).unwrap();
        }
        assert!(cursor.position() <= planned);
    }

    #[test]
    fn test_invalid_spec_surfaces_invalid_layout() {
        let mut cursor = ChunkCursor::dry_run();
        let err = cursor
            .carve_field(&FieldSpec::new("raw", 4, 10, 3))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidLayout(_)));

        let err = cursor.carve::<i32>(0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidLayout(_)));
    }
}

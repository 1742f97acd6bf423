//! The OS-backed byte range and its bump cursor.
//!
//! An [`Arena`] is mapped once with a fixed capacity and never grows.
//! Bump allocation hands out `[cursor, cursor + size)` and then advances
//! the cursor past `size` plus enough padding to land on the next
//! alignment boundary.

use crate::error::ArenaError;
use crate::raw::OsRegion;

/// A fixed-capacity mapping with a bump cursor.
///
/// Offsets are relative to [`base`](Arena::base). The arena does not
/// know which offsets are live; the heap's directories track that.
pub struct Arena {
    /// Backing storage. Mapped to full capacity at creation.
    region: OsRegion,
    /// Bump pointer: offset of the next unclaimed byte.
    cursor: usize,
    /// Power of two the cursor is padded to after each bump.
    alignment: usize,
}

impl Arena {
    /// Map a new arena of `capacity` bytes.
    ///
    /// `capacity` must be non-zero and `alignment` a power of two; both
    /// are checked by [`HeapConfig::validate`](crate::HeapConfig::validate).
    pub fn new(capacity: usize, alignment: usize) -> Result<Self, ArenaError> {
        debug_assert!(alignment.is_power_of_two());
        Ok(Self {
            region: OsRegion::map(capacity)?,
            cursor: 0,
            alignment,
        })
    }

    /// Bump-allocate `size` bytes.
    ///
    /// Returns the offset of the new region, or `None` if the remaining
    /// capacity is too small. A zero-size request still consumes one
    /// alignment unit so that every offset handed out is distinct.
    pub fn bump(&mut self, size: usize) -> Option<usize> {
        let extent = size.max(1);
        if self.remaining() < extent {
            return None;
        }
        let offset = self.cursor;
        // offset + extent <= capacity <= isize::MAX, so neither this nor
        // the round-up below can overflow.
        self.cursor = self.align_up(offset + extent).min(self.capacity());
        Some(offset)
    }

    /// Move the cursor back to `offset`.
    ///
    /// The caller guarantees nothing live lies in `[offset, cursor)`.
    pub fn retreat_to(&mut self, offset: usize) {
        debug_assert!(offset <= self.cursor);
        self.cursor = offset;
    }

    /// Move the cursor back by `size` bytes, stopping at zero.
    pub fn retreat_by(&mut self, size: usize) {
        self.cursor = self.cursor.saturating_sub(size);
    }

    /// Shared view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the capacity.
    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.region.as_slice()[offset..offset + len]
    }

    /// Mutable view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the capacity.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.region.as_mut_slice()[offset..offset + len]
    }

    /// Raw pointer to the byte at `offset`.
    ///
    /// The pointer keeps the mapping's provenance and stays valid until
    /// the arena is dropped.
    pub fn ptr_at(&self, offset: usize) -> *mut u8 {
        self.region.as_ptr().wrapping_add(offset)
    }

    /// Numeric address of the first byte.
    pub fn base(&self) -> usize {
        self.region.base()
    }

    /// Current bump offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Bytes between the cursor and the end of the arena.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    fn align_up(&self, value: usize) -> usize {
        (value + self.alignment - 1) & !(self.alignment - 1)
    }
}

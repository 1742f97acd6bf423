//! The extend-or-reuse-or-fail decision for a single request.

use crate::arena::Arena;
use crate::coalesce::merge_adjacent;
use crate::directory::FreeDirectory;

/// Where a request was placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Carved from bump space at the cursor.
    Bump {
        /// Offset of the new region.
        offset: usize,
    },
    /// Taken from a (coalesced) free region.
    Reuse {
        /// Offset of the donor region.
        offset: usize,
        /// Full size of the donor. Bytes past the requested size are
        /// retired, not returned to the free directory.
        donor_size: usize,
        /// Free entries absorbed by the coalesce pass that preceded the search.
        merges: usize,
    },
}

impl Placement {
    /// Offset of the placed region.
    pub fn offset(&self) -> usize {
        match *self {
            Self::Bump { offset } | Self::Reuse { offset, .. } => offset,
        }
    }
}

/// Decide where `size` bytes go.
///
/// Tries the cursor first, unless `size` is `usize::MAX` (always refused,
/// so wrapped size arithmetic in callers can never reach the arena). Then
/// coalesces the free directory and takes the first region large enough.
/// Returns `None` if neither works; the free directory stays coalesced.
pub fn place(arena: &mut Arena, free: &mut FreeDirectory, size: usize) -> Option<Placement> {
    if size != usize::MAX {
        if let Some(offset) = arena.bump(size) {
            return Some(Placement::Bump { offset });
        }
    }
    let merges = merge_adjacent(free);
    let (offset, donor_size) = free.take_first_fit(size)?;
    Some(Placement::Reuse {
        offset,
        donor_size,
        merges,
    })
}

//! Merging of address-adjacent free regions.
//!
//! Coalescing is lazy: releases only insert into the free directory, and
//! the allocation policy runs one merge pass right before it searches
//! for a donor region.

use crate::directory::FreeDirectory;

/// Merge every run of adjacent free regions into its first entry.
///
/// Two entries are adjacent when one ends exactly where the next begins.
/// A single ascending pass collapses chains of any length, because each
/// entry is compared against the (possibly already grown) entry before
/// it. Returns the number of entries absorbed.
pub fn merge_adjacent(free: &mut FreeDirectory) -> usize {
    let any_adjacent = free
        .regions
        .iter()
        .zip(free.regions.iter().skip(1))
        .any(|((&offset, &size), (&next, _))| offset + size == next);
    if !any_adjacent {
        return 0;
    }

    let mut merges = 0;
    let regions = std::mem::take(&mut free.regions);
    for (offset, size) in regions {
        if let Some(mut last) = free.regions.last_entry() {
            if *last.key() + *last.get() == offset {
                *last.get_mut() += size;
                merges += 1;
                continue;
            }
        }
        free.regions.insert(offset, size);
    }
    if merges > 0 {
        log::trace!(
            "coalesced {merges} free regions, {} remain",
            free.regions.len()
        );
    }
    merges
}

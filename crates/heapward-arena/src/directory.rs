//! Address-ordered directories of active and free regions.
//!
//! Both directories key regions by their offset from the arena base and
//! iterate in ascending address order. Entries are plain descriptors;
//! the bytes themselves belong to the [`Arena`](crate::arena::Arena).

use std::collections::BTreeMap;

use heapward_core::Origin;

/// A region currently handed out to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveRegion {
    /// Requested size in bytes.
    pub size: usize,
    /// Bytes of arena the region occupies: the padded bump span, or the
    /// whole donor on reuse. Never less than `size`.
    pub extent: usize,
    /// Where the allocation was requested from.
    pub origin: Origin,
}

/// Regions currently allocated, keyed by offset.
///
/// Invariant: entries are pairwise non-overlapping, and an offset is
/// present iff it was returned by an allocation and not yet released.
#[derive(Debug, Default)]
pub struct ActiveDirectory {
    regions: BTreeMap<usize, ActiveRegion>,
}

impl ActiveDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active region at `offset`.
    pub fn insert(&mut self, offset: usize, region: ActiveRegion) {
        let prev = self.regions.insert(offset, region);
        debug_assert!(prev.is_none(), "offset {offset} was already active");
    }

    /// Remove and return the region at `offset`.
    pub fn remove(&mut self, offset: usize) -> Option<ActiveRegion> {
        self.regions.remove(&offset)
    }

    /// The region at `offset`, if active.
    pub fn get(&self, offset: usize) -> Option<&ActiveRegion> {
        self.regions.get(&offset)
    }

    /// Number of active regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region is active.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sum of the sizes of all active regions.
    pub fn total_bytes(&self) -> usize {
        self.regions.values().map(|r| r.size).sum()
    }

    /// Iterate active regions in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ActiveRegion)> {
        self.regions.iter().map(|(&offset, region)| (offset, region))
    }
}

/// Released regions available for reuse, keyed by offset.
///
/// Invariant: entries are pairwise non-overlapping and disjoint from
/// the active directory. Adjacent entries may persist until the next
/// [`merge_adjacent`](crate::coalesce::merge_adjacent) pass.
#[derive(Debug, Default)]
pub struct FreeDirectory {
    pub(crate) regions: BTreeMap<usize, usize>,
}

impl FreeDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a released region.
    pub fn insert(&mut self, offset: usize, size: usize) {
        let prev = self.regions.insert(offset, size);
        debug_assert!(prev.is_none(), "offset {offset} was already free");
    }

    /// Remove the region at `offset`, returning its size.
    pub fn remove(&mut self, offset: usize) -> Option<usize> {
        self.regions.remove(&offset)
    }

    /// The free region with the highest offset.
    pub fn last(&self) -> Option<(usize, usize)> {
        self.regions
            .last_key_value()
            .map(|(&offset, &size)| (offset, size))
    }

    /// First-fit: remove and return the lowest-addressed region of at
    /// least `size` bytes, as `(offset, donor_size)`.
    pub fn take_first_fit(&mut self, size: usize) -> Option<(usize, usize)> {
        let (&offset, &donor) = self.regions.iter().find(|(_, &s)| s >= size)?;
        self.regions.remove(&offset);
        Some((offset, donor))
    }

    /// Number of free regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether there are no free regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sum of the sizes of all free regions.
    pub fn total_bytes(&self) -> usize {
        self.regions.values().sum()
    }

    /// Iterate free regions as `(offset, size)` in ascending offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.regions.iter().map(|(&offset, &size)| (offset, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(size: usize) -> ActiveRegion {
        ActiveRegion {
            size,
            extent: size,
            origin: Origin::unknown(),
        }
    }

    #[test]
    fn active_insert_remove() {
        let mut active = ActiveDirectory::new();
        active.insert(0, region(10));
        active.insert(16, region(20));
        assert_eq!(active.len(), 2);
        assert_eq!(active.total_bytes(), 30);
        assert_eq!(active.remove(0).unwrap().size, 10);
        assert!(active.get(0).is_none());
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn active_iterates_in_address_order() {
        let mut active = ActiveDirectory::new();
        active.insert(64, region(1));
        active.insert(0, region(2));
        active.insert(32, region(3));
        let offsets: Vec<usize> = active.iter().map(|(o, _)| o).collect();
        assert_eq!(offsets, vec![0, 32, 64]);
    }

    #[test]
    fn first_fit_picks_lowest_address() {
        let mut free = FreeDirectory::new();
        free.insert(96, 100);
        free.insert(0, 50);
        free.insert(48, 200);
        assert_eq!(free.take_first_fit(60), Some((48, 200)));
        assert_eq!(free.remove(48), None);
        assert_eq!(free.len(), 2);
    }

    #[test]
    fn first_fit_none_when_nothing_large_enough() {
        let mut free = FreeDirectory::new();
        free.insert(0, 8);
        assert_eq!(free.take_first_fit(9), None);
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn zero_size_request_takes_first_entry() {
        let mut free = FreeDirectory::new();
        free.insert(32, 4);
        free.insert(16, 0);
        assert_eq!(free.take_first_fit(0), Some((16, 0)));
    }

    #[test]
    fn last_returns_highest_offset() {
        let mut free = FreeDirectory::new();
        assert_eq!(free.last(), None);
        free.insert(0, 8);
        free.insert(64, 16);
        assert_eq!(free.last(), Some((64, 16)));
        assert_eq!(free.total_bytes(), 24);
    }
}

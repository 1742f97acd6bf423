//! The allocator context: arena, directories, and counters behind one handle.
//!
//! [`Heap`] is constructed once, owns its arena exclusively, and unmaps it
//! when dropped. Every operation takes `&mut self`; there is no global
//! state, so independent heaps can coexist (one per test, for example).

use std::collections::BTreeSet;

use heapward_core::{
    Address, AllocError, AllocStats, CursorPolicy, FreeError, Origin, ReportingMode,
};

use crate::arena::Arena;
use crate::config::HeapConfig;
use crate::directory::{ActiveDirectory, ActiveRegion, FreeDirectory};
use crate::error::ArenaError;
use crate::policy::{self, Placement};

/// A fixed-capacity tracking allocator.
///
/// # Examples
///
/// ```
/// use heapward_arena::{Heap, HeapConfig};
///
/// let mut heap = Heap::new(HeapConfig::new(4096)).unwrap();
/// let a = heap.allocate(100).unwrap();
/// heap.bytes_mut(a).unwrap()[0] = 7;
/// heap.release(Some(a)).unwrap();
/// assert_eq!(heap.statistics().active_count, 0);
/// assert_eq!(heap.statistics().total_count, 1);
/// ```
pub struct Heap {
    config: HeapConfig,
    pub(crate) arena: Arena,
    pub(crate) active: ActiveDirectory,
    pub(crate) free: FreeDirectory,
    pub(crate) stats: AllocStats,
    /// Offsets released and not handed out again since. A second release
    /// of one of these is a double free even after the free entry was
    /// merged away or returned to bump space.
    released: BTreeSet<usize>,
    invalid_frees: u64,
}

impl Heap {
    /// Map an arena and create an empty heap over it.
    pub fn new(config: HeapConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let arena = Arena::new(config.capacity, config.alignment)?;
        let base = arena.base();
        let stats = AllocStats::new(base, base + arena.capacity());
        Ok(Self {
            config,
            arena,
            active: ActiveDirectory::new(),
            free: FreeDirectory::new(),
            stats,
            released: BTreeSet::new(),
            invalid_frees: 0,
        })
    }

    /// The configuration this heap was built with.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    // ── Allocation ────────────────────────────────────────────────

    /// Allocate `size` bytes, recording the caller as the origin.
    ///
    /// Returns `None` on failure. The contents are not initialised (they
    /// may hold bytes from a previously released region).
    #[track_caller]
    pub fn allocate(&mut self, size: usize) -> Option<Address> {
        self.try_allocate_at(size, Origin::caller()).ok()
    }

    /// Allocate `size` bytes on behalf of `origin`.
    pub fn allocate_at(&mut self, size: usize, origin: Origin) -> Option<Address> {
        self.try_allocate_at(size, origin).ok()
    }

    /// Like [`allocate`](Self::allocate), but reports why on failure.
    #[track_caller]
    pub fn try_allocate(&mut self, size: usize) -> Result<Address, AllocError> {
        self.try_allocate_at(size, Origin::caller())
    }

    /// Allocate `size` bytes on behalf of `origin`, reporting why on failure.
    ///
    /// Every call first counts itself in `total_*`. On failure that is
    /// rolled back and `fail_*` is incremented instead.
    pub fn try_allocate_at(&mut self, size: usize, origin: Origin) -> Result<Address, AllocError> {
        self.stats.begin_attempt(size);
        match policy::place(&mut self.arena, &mut self.free, size) {
            Some(placement) => {
                let offset = placement.offset();
                let extent = match placement {
                    Placement::Bump { .. } => {
                        log::trace!("bump {size} bytes at +{offset:#x} for {origin}");
                        self.arena.cursor() - offset
                    }
                    Placement::Reuse {
                        donor_size, merges, ..
                    } => {
                        log::trace!(
                            "reuse +{offset:#x} ({donor_size}-byte donor, {merges} merges) \
                             for {size} bytes from {origin}"
                        );
                        donor_size
                    }
                };
                self.forget_released(offset, extent);
                self.active.insert(
                    offset,
                    ActiveRegion {
                        size,
                        extent,
                        origin,
                    },
                );
                self.stats.record_success(size);
                Ok(self.address_of(offset))
            }
            None => {
                self.stats.record_failure(size);
                log::debug!(
                    "allocation of {size} bytes from {origin} failed: cursor {}/{}, {} free regions",
                    self.arena.cursor(),
                    self.arena.capacity(),
                    self.free.len()
                );
                Err(if size == usize::MAX {
                    AllocError::SentinelSize
                } else {
                    AllocError::Exhausted { requested: size }
                })
            }
        }
    }

    /// Allocate a zero-filled array of `count` elements of `size` bytes,
    /// recording the caller as the origin.
    #[track_caller]
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Address> {
        self.try_allocate_zeroed_at(count, size, Origin::caller()).ok()
    }

    /// Zero-filled array allocation on behalf of `origin`.
    pub fn allocate_zeroed_at(
        &mut self,
        count: usize,
        size: usize,
        origin: Origin,
    ) -> Option<Address> {
        self.try_allocate_zeroed_at(count, size, origin).ok()
    }

    /// Like [`allocate_zeroed`](Self::allocate_zeroed), but reports why on failure.
    #[track_caller]
    pub fn try_allocate_zeroed(&mut self, count: usize, size: usize) -> Result<Address, AllocError> {
        self.try_allocate_zeroed_at(count, size, Origin::caller())
    }

    /// Zero-filled array allocation, reporting why on failure.
    ///
    /// If `count * size` overflows, only `fail_count` is incremented and
    /// the arena is not touched.
    pub fn try_allocate_zeroed_at(
        &mut self,
        count: usize,
        size: usize,
        origin: Origin,
    ) -> Result<Address, AllocError> {
        let Some(total) = count.checked_mul(size) else {
            self.stats.record_rejection();
            log::debug!("zeroed allocation {count} x {size} from {origin} overflows");
            return Err(AllocError::MultiplyOverflow { count, size });
        };
        let address = self.try_allocate_at(total, origin)?;
        if let Some(bytes) = self.bytes_mut(address) {
            bytes.fill(0);
        }
        Ok(address)
    }

    // ── Release ───────────────────────────────────────────────────

    /// Release `address`, recording the caller as the origin.
    ///
    /// `None` is a no-op.
    #[track_caller]
    pub fn release(&mut self, address: Option<Address>) -> Result<(), FreeError> {
        self.release_at(address, Origin::caller())
    }

    /// Release `address` on behalf of `origin`.
    ///
    /// `None` is a no-op. Any other address first decrements
    /// `active_count` (saturating at zero). If the address is active, its
    /// region moves to the free directory (or back to bump space, see
    /// [`CursorPolicy`]). If not, nothing else changes and the error is
    /// surfaced according to the heap's [`ReportingMode`].
    pub fn release_at(&mut self, address: Option<Address>, origin: Origin) -> Result<(), FreeError> {
        let Some(address) = address else {
            return Ok(());
        };
        self.stats.release_one();

        let found = self
            .offset_of(address)
            .and_then(|offset| self.active.remove(offset).map(|region| (offset, region)));
        match found {
            Some((offset, region)) => {
                self.stats.release_bytes(region.size);
                self.released.insert(offset);
                self.reclaim(offset, &region);
                log::trace!("released {address} ({} bytes) from {origin}", region.size);
                Ok(())
            }
            None => {
                let err = self.classify_invalid(address);
                self.invalid_frees += 1;
                self.report_invalid(&err, &origin);
                Err(err)
            }
        }
    }

    /// Hand a just-released region back according to the cursor policy.
    ///
    /// Under `Frontier` free entries record the full extent, so the
    /// regions below the cursor always tile it and a drained heap ends
    /// with the cursor back at zero.
    fn reclaim(&mut self, offset: usize, region: &ActiveRegion) {
        match self.config.cursor_policy {
            CursorPolicy::Retain => self.free.insert(offset, region.size),
            CursorPolicy::Unconditional => {
                self.free.insert(offset, region.size);
                self.arena.retreat_by(region.size);
            }
            CursorPolicy::Frontier => {
                if offset + region.extent != self.arena.cursor() {
                    self.free.insert(offset, region.extent);
                    return;
                }
                self.arena.retreat_to(offset);
                // Free regions now sitting at the cursor go back too.
                while let Some((last, last_extent)) = self.free.last() {
                    if last + last_extent != self.arena.cursor() {
                        break;
                    }
                    self.free.remove(last);
                    self.arena.retreat_to(last);
                }
                log::trace!("cursor retreated to +{:#x}", self.arena.cursor());
            }
        }
    }

    /// Drop released offsets inside a span that is being handed out again.
    fn forget_released(&mut self, offset: usize, extent: usize) {
        let mut tail = self.released.split_off(&offset);
        let mut beyond = tail.split_off(&(offset + extent.max(1)));
        self.released.append(&mut beyond);
    }

    fn classify_invalid(&self, address: Address) -> FreeError {
        match self.offset_of(address) {
            Some(offset) if self.released.contains(&offset) => FreeError::DoubleFree { address },
            _ => FreeError::UnknownPointer { address },
        }
    }

    fn report_invalid(&self, err: &FreeError, origin: &Origin) {
        match self.config.reporting_mode {
            ReportingMode::Silent => {}
            ReportingMode::ReportOnly => log::warn!("{origin}: {err}"),
            ReportingMode::AbortOnInvalidFree => {
                log::error!("{origin}: {err}; aborting");
                std::process::abort();
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────

    /// Copy of the current counters.
    pub fn statistics(&self) -> AllocStats {
        self.stats
    }

    /// Number of rejected releases (double frees and unknown pointers).
    pub fn invalid_frees(&self) -> u64 {
        self.invalid_frees
    }

    /// Requested size of the active region at `address`.
    pub fn size_of(&self, address: Address) -> Option<usize> {
        let offset = self.offset_of(address)?;
        self.active.get(offset).map(|r| r.size)
    }

    /// Contents of the active region at `address`.
    pub fn bytes(&self, address: Address) -> Option<&[u8]> {
        let offset = self.offset_of(address)?;
        let size = self.active.get(offset)?.size;
        Some(self.arena.slice(offset, size))
    }

    /// Mutable contents of the active region at `address`.
    pub fn bytes_mut(&mut self, address: Address) -> Option<&mut [u8]> {
        let offset = self.offset_of(address)?;
        let size = self.active.get(offset)?.size;
        Some(self.arena.slice_mut(offset, size))
    }

    /// Raw pointer to the active region at `address`, or null if the
    /// address is not active. Valid until the region is released or the
    /// heap is dropped.
    pub fn as_ptr(&self, address: Address) -> *mut u8 {
        match self.offset_of(address) {
            Some(offset) if self.active.get(offset).is_some() => self.arena.ptr_at(offset),
            _ => std::ptr::null_mut(),
        }
    }

    /// Active regions as `(address, region)`, ascending.
    pub fn active_regions(&self) -> impl Iterator<Item = (Address, &ActiveRegion)> {
        let base = self.arena.base();
        self.active
            .iter()
            .map(move |(offset, region)| (Address(base + offset), region))
    }

    /// Free regions as `(address, size)`, ascending.
    pub fn free_regions(&self) -> impl Iterator<Item = (Address, usize)> + '_ {
        let base = self.arena.base();
        self.free
            .iter()
            .map(move |(offset, size)| (Address(base + offset), size))
    }

    /// Merge adjacent free regions now, returning how many were absorbed.
    ///
    /// The allocation policy does this on its own before every reuse
    /// search; calling it directly is only useful for inspection.
    pub fn coalesce(&mut self) -> usize {
        crate::coalesce::merge_adjacent(&mut self.free)
    }

    /// Current bump offset.
    pub fn cursor(&self) -> usize {
        self.arena.cursor()
    }

    /// Arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    fn address_of(&self, offset: usize) -> Address {
        Address(self.arena.base() + offset)
    }

    fn offset_of(&self, address: Address) -> Option<usize> {
        address
            .offset_from(self.arena.base())
            .filter(|&offset| offset < self.arena.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(capacity: usize) -> Heap {
        Heap::new(HeapConfig::new(capacity).with_reporting_mode(ReportingMode::Silent)).unwrap()
    }

    fn heap_with(capacity: usize, policy: CursorPolicy) -> Heap {
        Heap::new(
            HeapConfig::new(capacity)
                .with_reporting_mode(ReportingMode::Silent)
                .with_cursor_policy(policy),
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Heap::new(HeapConfig::new(0));
        assert!(matches!(result, Err(ArenaError::Config(_))));
    }

    #[test]
    fn bounds_match_arena() {
        let heap = heap(4096);
        let stats = heap.statistics();
        assert_eq!(stats.heap_max - stats.heap_min, 4096);
    }

    #[test]
    fn addresses_are_16_byte_aligned_and_in_bounds() {
        let mut heap = heap(4096);
        for size in [1, 7, 16, 33, 100] {
            let a = heap.allocate(size).unwrap();
            assert!(a.is_aligned_to(16));
            let stats = heap.statistics();
            assert!(a.get() >= stats.heap_min && a.get() + size <= stats.heap_max);
        }
    }

    #[test]
    fn allocate_updates_counters() {
        let mut heap = heap(4096);
        heap.allocate(10).unwrap();
        heap.allocate(20).unwrap();
        let stats = heap.statistics();
        assert_eq!(stats.active_count, 2);
        assert_eq!(stats.active_bytes, 30);
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_bytes, 30);
        assert_eq!(stats.fail_count, 0);
    }

    #[test]
    fn release_moves_region_to_free_directory() {
        let mut heap = heap(4096);
        let a = heap.allocate(10).unwrap();
        heap.release(Some(a)).unwrap();
        assert_eq!(heap.active_regions().count(), 0);
        assert_eq!(heap.free_regions().collect::<Vec<_>>(), vec![(a, 10)]);
        let stats = heap.statistics();
        assert_eq!(stats.active_count, 0);
        assert_eq!(stats.active_bytes, 0);
    }

    #[test]
    fn retain_policy_keeps_cursor() {
        let mut heap = heap(4096);
        let a = heap.allocate(10).unwrap();
        let cursor = heap.cursor();
        heap.release(Some(a)).unwrap();
        assert_eq!(heap.cursor(), cursor);
    }

    #[test]
    fn null_release_is_noop() {
        let mut heap = heap(4096);
        heap.allocate(10).unwrap();
        let before = heap.statistics();
        assert_eq!(heap.release(None), Ok(()));
        assert_eq!(heap.statistics(), before);
        assert_eq!(heap.invalid_frees(), 0);
    }

    #[test]
    fn double_free_detected() {
        let mut heap = heap(4096);
        let a = heap.allocate(10).unwrap();
        let _b = heap.allocate(10).unwrap();
        heap.release(Some(a)).unwrap();
        assert_eq!(
            heap.release(Some(a)),
            Err(FreeError::DoubleFree { address: a })
        );
        assert_eq!(heap.invalid_frees(), 1);
        assert_eq!(heap.free_regions().count(), 1);
    }

    #[test]
    fn double_free_detected_after_coalesce() {
        let mut heap = heap(4096);
        let a = heap.allocate(16).unwrap();
        let b = heap.allocate(16).unwrap();
        heap.release(Some(a)).unwrap();
        heap.release(Some(b)).unwrap();
        assert_eq!(heap.coalesce(), 1);
        assert_eq!(heap.free_regions().count(), 1);
        assert_eq!(
            heap.release(Some(b)),
            Err(FreeError::DoubleFree { address: b })
        );
    }

    #[test]
    fn double_free_detected_after_frontier_retreat() {
        let mut heap = heap_with(4096, CursorPolicy::Frontier);
        let a = heap.allocate(24).unwrap();
        heap.release(Some(a)).unwrap();
        assert_eq!(heap.cursor(), 0);
        assert_eq!(
            heap.release(Some(a)),
            Err(FreeError::DoubleFree { address: a })
        );
    }

    #[test]
    fn reused_span_forgets_earlier_releases() {
        let mut heap = heap(64);
        let a = heap.allocate(16).unwrap();
        let b = heap.allocate(16).unwrap();
        heap.allocate(32).unwrap();
        heap.release(Some(a)).unwrap();
        heap.release(Some(b)).unwrap();
        // Coalesced donor [a, a + 32) now covers b.
        let c = heap.allocate(32).unwrap();
        assert_eq!(c, a);
        assert_eq!(
            heap.release(Some(b)),
            Err(FreeError::UnknownPointer { address: b })
        );
        assert_eq!(heap.release(Some(c)), Ok(()));
    }

    #[test]
    fn interior_and_foreign_pointers_are_unknown() {
        let mut heap = heap(4096);
        let a = heap.allocate(64).unwrap();
        let interior = Address(a.get() + 8);
        assert_eq!(
            heap.release(Some(interior)),
            Err(FreeError::UnknownPointer { address: interior })
        );
        let foreign = Address(heap.statistics().heap_max + 64);
        assert!(matches!(
            heap.release(Some(foreign)),
            Err(FreeError::UnknownPointer { .. })
        ));
        assert_eq!(heap.size_of(a), Some(64));
        assert_eq!(heap.invalid_frees(), 2);
    }

    #[test]
    fn invalid_release_only_touches_active_count() {
        let mut heap = heap(4096);
        heap.allocate(10).unwrap();
        heap.allocate(10).unwrap();
        let before = heap.statistics();
        let bogus = Address(before.heap_min + 8);
        assert!(heap.release(Some(bogus)).is_err());
        let after = heap.statistics();
        assert_eq!(after.active_count, before.active_count - 1);
        assert_eq!(after.active_bytes, before.active_bytes);
        assert_eq!(after.total_count, before.total_count);
    }

    #[test]
    fn reuse_returns_same_address() {
        let mut heap = heap(64);
        let a = heap.allocate(64).unwrap();
        heap.release(Some(a)).unwrap();
        let b = heap.allocate(40).unwrap();
        assert_eq!(a, b);
        assert_eq!(heap.size_of(b), Some(40));
    }

    #[test]
    fn zeroed_allocation_clears_reused_bytes() {
        let mut heap = heap(64);
        let a = heap.allocate(64).unwrap();
        heap.bytes_mut(a).unwrap().fill(0xFF);
        heap.release(Some(a)).unwrap();
        let b = heap.allocate_zeroed(4, 16).unwrap();
        assert_eq!(a, b);
        assert!(heap.bytes(b).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn zeroed_overflow_counts_only_fail_count() {
        let mut heap = heap(4096);
        let result = heap.try_allocate_zeroed_at(usize::MAX / 2, 3, Origin::unknown());
        assert!(matches!(result, Err(AllocError::MultiplyOverflow { .. })));
        let stats = heap.statistics();
        assert_eq!(stats.fail_count, 1);
        assert_eq!(stats.fail_bytes, 0);
        assert_eq!(stats.total_count, 0);
        assert_eq!(heap.cursor(), 0);
    }

    #[test]
    fn zero_size_allocations_are_distinct() {
        let mut heap = heap(4096);
        let a = heap.allocate(0).unwrap();
        let b = heap.allocate(0).unwrap();
        assert_ne!(a, b);
        assert_eq!(heap.bytes(a).unwrap().len(), 0);
        heap.release(Some(a)).unwrap();
        heap.release(Some(b)).unwrap();
        assert_eq!(heap.statistics().active_count, 0);
    }

    #[test]
    fn exhaustion_reports_requested_size() {
        let mut heap = heap(64);
        heap.allocate(64).unwrap();
        assert_eq!(
            heap.try_allocate_at(1, Origin::unknown()),
            Err(AllocError::Exhausted { requested: 1 })
        );
        let stats = heap.statistics();
        assert_eq!(stats.fail_count, 1);
        assert_eq!(stats.fail_bytes, 1);
        assert_eq!(stats.total_count, 1);
    }

    #[test]
    fn sentinel_size_always_fails() {
        let mut heap = heap(4096);
        assert_eq!(
            heap.try_allocate_at(usize::MAX, Origin::unknown()),
            Err(AllocError::SentinelSize)
        );
        assert_eq!(heap.statistics().total_bytes, 0);
        assert_eq!(heap.statistics().fail_bytes, usize::MAX as u64);
    }

    #[test]
    fn origin_is_recorded() {
        let mut heap = heap(4096);
        let a = heap.allocate_at(8, Origin::new("main.c", 12)).unwrap();
        let (addr, region) = heap.active_regions().next().unwrap();
        assert_eq!(addr, a);
        assert_eq!(region.origin, Origin::new("main.c", 12));
        let b = heap.allocate(8).unwrap();
        let region = heap.active_regions().find(|(x, _)| *x == b).unwrap().1;
        assert!(region.origin.file.ends_with("heap.rs"));
        let c = heap.try_allocate_zeroed(2, 4).unwrap();
        let region = heap.active_regions().find(|(x, _)| *x == c).unwrap().1;
        assert!(region.origin.file.ends_with("heap.rs"));
        assert!(region.origin.line > 0);
    }

    #[test]
    fn try_allocate_reports_exhaustion() {
        let mut heap = heap(64);
        heap.try_allocate(64).unwrap();
        assert_eq!(
            heap.try_allocate(16),
            Err(AllocError::Exhausted { requested: 16 })
        );
    }

    #[test]
    fn as_ptr_is_null_for_inactive() {
        let mut heap = heap(4096);
        let a = heap.allocate(8).unwrap();
        assert_eq!(heap.as_ptr(a) as usize, a.get());
        heap.release(Some(a)).unwrap();
        assert!(heap.as_ptr(a).is_null());
    }

    #[test]
    fn frontier_policy_retreats_on_last_block() {
        let mut heap = heap_with(4096, CursorPolicy::Frontier);
        let a = heap.allocate(10).unwrap();
        let b = heap.allocate(10).unwrap();
        heap.release(Some(b)).unwrap();
        assert_eq!(heap.cursor(), 16);
        assert_eq!(heap.free_regions().count(), 0);
        let c = heap.allocate(10).unwrap();
        assert_eq!(b, c);
        let _ = a;
    }

    #[test]
    fn frontier_policy_keeps_interior_blocks_free() {
        let mut heap = heap_with(4096, CursorPolicy::Frontier);
        let a = heap.allocate(10).unwrap();
        let b = heap.allocate(10).unwrap();
        heap.release(Some(a)).unwrap();
        assert_eq!(heap.cursor(), 32);
        assert_eq!(heap.free_regions().count(), 1);
        // Releasing the frontier block also absorbs the free block behind it.
        heap.release(Some(b)).unwrap();
        assert_eq!(heap.cursor(), 0);
        assert_eq!(heap.free_regions().count(), 0);
    }

    #[test]
    fn frontier_policy_reclaims_reused_blocks() {
        let mut heap = heap_with(64, CursorPolicy::Frontier);
        let a = heap.allocate(32).unwrap();
        let b = heap.allocate(32).unwrap();
        heap.release(Some(a)).unwrap();
        // Bump space is gone, so the smaller request takes all of a's block.
        let c = heap.allocate(16).unwrap();
        assert_eq!(c, a);
        assert_eq!(heap.active_regions().find(|(x, _)| *x == c).unwrap().1.extent, 32);
        heap.release(Some(b)).unwrap();
        assert_eq!(heap.cursor(), 32);
        heap.release(Some(c)).unwrap();
        assert_eq!(heap.cursor(), 0);
        assert_eq!(heap.free_regions().count(), 0);
        assert!(heap.allocate(48).is_some());
    }

    #[test]
    fn bump_extent_includes_padding() {
        let mut heap = heap(4096);
        let a = heap.allocate(33).unwrap();
        let region = heap.active_regions().find(|(x, _)| *x == a).unwrap().1;
        assert_eq!((region.size, region.extent), (33, 48));
    }

    #[test]
    fn unconditional_policy_decrements_by_size() {
        let mut heap = heap_with(4096, CursorPolicy::Unconditional);
        let a = heap.allocate(1000).unwrap();
        assert_eq!(heap.cursor(), 1008);
        heap.release(Some(a)).unwrap();
        assert_eq!(heap.cursor(), 8);
        assert_eq!(heap.free_regions().count(), 1);
    }
}

//! Heap constructors and invariant checks shared by tests and benches.

use heapward_arena::{CursorPolicy, Heap, HeapConfig, ReportingMode};

/// A heap of `capacity` bytes that never logs invalid releases.
pub fn silent_heap(capacity: usize, policy: CursorPolicy) -> Heap {
    Heap::new(
        HeapConfig::new(capacity)
            .with_reporting_mode(ReportingMode::Silent)
            .with_cursor_policy(policy),
    )
    .expect("test heap config is valid and mappable")
}

/// Check the invariants that must hold between any two operations on a
/// heap whose releases were all valid:
///
/// - every active and free region lies inside `[heap_min, heap_max)`;
/// - active and free regions are pairwise non-overlapping, across both
///   directories;
/// - `active_count` and `active_bytes` agree with the active directory.
///
/// Returns a description of the first violation found.
pub fn check_invariants(heap: &Heap) -> Result<(), String> {
    let stats = heap.statistics();

    let mut regions: Vec<(usize, usize, &'static str)> = heap
        .active_regions()
        .map(|(a, r)| (a.get(), r.size, "active"))
        .chain(heap.free_regions().map(|(a, size)| (a.get(), size, "free")))
        .collect();
    regions.sort_unstable();

    for &(start, size, kind) in &regions {
        if start < stats.heap_min || start + size > stats.heap_max {
            return Err(format!(
                "{kind} region {start:#x}+{size} outside [{:#x}, {:#x})",
                stats.heap_min, stats.heap_max
            ));
        }
    }
    for pair in regions.windows(2) {
        let (a_start, a_size, a_kind) = pair[0];
        let (b_start, _, b_kind) = pair[1];
        if a_start == b_start || a_start + a_size > b_start {
            return Err(format!(
                "{a_kind} region {a_start:#x}+{a_size} overlaps {b_kind} region at {b_start:#x}"
            ));
        }
    }

    let active_len = heap.active_regions().count() as u64;
    if stats.active_count != active_len {
        return Err(format!(
            "active_count {} but {active_len} active regions",
            stats.active_count
        ));
    }
    let active_sum: u64 = heap.active_regions().map(|(_, r)| r.size as u64).sum();
    if stats.active_bytes != active_sum {
        return Err(format!(
            "active_bytes {} but active regions sum to {active_sum}",
            stats.active_bytes
        ));
    }
    Ok(())
}

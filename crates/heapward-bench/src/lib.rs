//! Benchmark heap profiles for the Heapward allocator.
//!
//! - [`bench_heap`]: an empty silent heap with the given cursor policy
//! - [`exhausted_heap`]: bump space fully consumed by equal blocks
//! - [`fragmented_heap`]: bump space consumed, every block released and
//!   left uncoalesced, so the next reuse search pays for a full merge

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use heapward_arena::{Address, CursorPolicy, Heap, HeapConfig, ReportingMode};

/// Arena size used by every profile: the default 8 MiB.
pub const BENCH_CAPACITY: usize = HeapConfig::DEFAULT_CAPACITY;

/// An empty heap that never logs invalid releases.
pub fn bench_heap(capacity: usize, policy: CursorPolicy) -> Heap {
    let config = HeapConfig::new(capacity)
        .with_reporting_mode(ReportingMode::Silent)
        .with_cursor_policy(policy);
    match Heap::new(config) {
        Ok(heap) => heap,
        Err(e) => panic!("benchmark heap of {capacity} bytes: {e}"),
    }
}

/// A heap whose bump space is exhausted by `block`-byte allocations.
///
/// Returns the heap and the live addresses in ascending order.
pub fn exhausted_heap(capacity: usize, block: usize) -> (Heap, Vec<Address>) {
    let mut heap = bench_heap(capacity, CursorPolicy::Retain);
    let mut live = Vec::with_capacity(capacity / block.max(1));
    while let Some(address) = heap.allocate(block) {
        live.push(address);
    }
    (heap, live)
}

/// A heap with `capacity / block` adjacent free regions and no bump space.
pub fn fragmented_heap(capacity: usize, block: usize) -> Heap {
    let (mut heap, live) = exhausted_heap(capacity, block);
    for address in live {
        let _ = heap.release(Some(address));
    }
    heap
}

//! Heapward churn: a seeded allocate/release workload run under each
//! cursor policy, then grouped by allocation site.
//!
//! Demonstrates:
//!   1. How `Retain` and `Frontier` differ in where the cursor ends up
//!   2. Reuse through the lazy coalescer once bump space runs out
//!   3. `leak_summary` grouping live regions by origin
//!
//! Run with:
//!   cargo run --example churn

use heapward::prelude::*;
use heapward_test_utils::{check_invariants, ChurnWorkload, Replay};

const CAPACITY: usize = 256 * 1024;
const OPS: usize = 50_000;

fn main() -> Result<(), ArenaError> {
    for policy in [CursorPolicy::Retain, CursorPolicy::Frontier] {
        let config = HeapConfig::new(CAPACITY).with_cursor_policy(policy);
        let mut heap = Heap::new(config)?;
        let mut workload = ChurnWorkload::new(2024, 4096, 45);
        let mut replay = Replay::new();
        for _ in 0..OPS {
            replay.apply(&mut heap, workload.next_op());
        }
        if let Err(violation) = check_invariants(&heap) {
            eprintln!("{policy:?}: {violation}");
        }

        println!("── {policy:?} ──");
        println!(
            "cursor {:#x}/{:#x}, {} free regions, {} live",
            heap.cursor(),
            heap.capacity(),
            heap.free_regions().count(),
            replay.live.len()
        );
        heap.print_statistics();

        // A tagged origin shows up as its own site.
        heap.allocate_at(64, Origin::new("churn.rs", 1));
        for (origin, site) in heap.leak_summary() {
            println!("  {origin}: {} objects, {} bytes", site.count, site.bytes);
        }
        println!();
    }
    Ok(())
}

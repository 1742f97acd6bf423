//! Heapward diabolical requests: the allocations a tracking allocator
//! must refuse without corrupting its counters.
//!
//! Demonstrates:
//!   1. A long malloc/free loop that must never exhaust the arena
//!   2. A `usize::MAX` request failing with exact statistics rollback
//!   3. A `calloc` whose `count * size` overflows
//!   4. Double and wild releases under `ReportOnly`
//!   5. The statistics summary and the leak report
//!
//! Run with:
//!   cargo run --example diabolical

use heapward::prelude::*;

fn main() -> Result<(), ArenaError> {
    // ─── 1. Ten thousand small cycles ─────────────────────────
    let mut heap = Heap::new(HeapConfig::default())?;
    for i in 0..10_000 {
        let p = heap.allocate(1 + i % 128);
        assert!(p.is_some(), "cycle {i} ran out of memory");
        heap.release(p).ok();
    }
    println!("10000 malloc/free cycles:");
    heap.print_statistics();

    // ─── 2. Sentinel size after a partial release ─────────────
    let mut heap = Heap::new(HeapConfig::default())?;
    let ptrs: Vec<_> = (0..10).map(|i| heap.allocate(i + 1)).collect();
    for &p in &ptrs[..5] {
        heap.release(p).ok();
    }
    match heap.try_allocate(usize::MAX) {
        Ok(_) => unreachable!("sentinel request succeeded"),
        Err(e) => println!("\nmalloc(SIZE_MAX): {e}"),
    }
    heap.print_statistics();

    // ─── 3. Overflowing calloc ────────────────────────────────
    let mut heap = Heap::new(HeapConfig::default())?;
    let count = usize::MAX / 8 + 2;
    match heap.try_allocate_zeroed(count, 16) {
        Ok(_) => unreachable!("overflowing calloc succeeded"),
        Err(e) => println!("\ncalloc({count}, 16): {e}"),
    }
    heap.print_statistics();

    // ─── 4. Invalid releases ──────────────────────────────────
    let mut heap = Heap::new(HeapConfig::new(4096))?;
    let a = heap.allocate(32);
    heap.release(a).ok();
    if let Err(e) = heap.release(a) {
        println!("\nsecond free: {e}");
    }
    if let Err(e) = heap.release(Some(Address(0x10))) {
        println!("wild free:   {e}");
    }
    println!("invalid releases recorded: {}", heap.invalid_frees());

    // ─── 5. Leaks ─────────────────────────────────────────────
    let _kept = heap.allocate(48);
    let _also_kept = heap.allocate_zeroed(3, 8);
    println!();
    heap.print_leak_report();
    Ok(())
}

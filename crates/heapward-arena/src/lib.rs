//! Fixed-arena tracking allocator engine.
//!
//! A [`Heap`] carves every allocation out of one contiguous region mapped
//! from the OS when the heap is created and unmapped when it is dropped.
//! It never grows. Each region handed out is recorded so the heap can
//! answer statistics queries, produce leak reports, and tell a double
//! free apart from a pointer it never returned.
//!
//! # Architecture
//!
//! ```text
//! Heap (allocator context, one per arena)
//! ├── Arena            (OS mapping + bump cursor, 16-byte aligned steps)
//! ├── ActiveDirectory  (offset → size + origin, ascending)
//! ├── FreeDirectory    (offset → size, ascending, coalesced lazily)
//! └── AllocStats       (active / total / fail counters, arena bounds)
//! ```
//!
//! # Allocation policy
//!
//! 1. Bump-allocate at the cursor if the remaining capacity fits.
//! 2. Otherwise merge adjacent free regions in one ascending pass.
//! 3. Take the first free region large enough. The remainder of an
//!    oversized donor is not split off; it stays retired until the heap
//!    is dropped.
//! 4. Otherwise fail: the optimistic `total_*` increments are rolled
//!    back and `fail_*` is incremented instead.
//!
//! # Safety
//!
//! All `unsafe` code is confined to the private `raw` module, which owns
//! the OS mapping and exposes it as byte slices.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod coalesce;
pub mod config;
pub mod directory;
pub mod error;
pub mod heap;
pub mod policy;
mod raw;
pub mod report;

// Public re-exports for the primary API surface.
pub use config::{ConfigError, HeapConfig};
pub use error::ArenaError;
pub use heap::Heap;
pub use heapward_core::{
    Address, AllocError, AllocStats, CursorPolicy, FreeError, Origin, ReportingMode,
};
pub use report::LeakSite;

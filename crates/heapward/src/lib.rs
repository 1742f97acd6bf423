//! Heapward: a tracking allocator over a fixed, OS-mapped arena.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Heapward sub-crates. Every allocation is recorded with its size and
//! call site; the heap keeps allocation statistics, classifies invalid
//! releases, and reports leaks on demand.
//!
//! # Quick start
//!
//! ```rust
//! use heapward::prelude::*;
//!
//! let mut heap = Heap::new(HeapConfig::new(64 * 1024)).unwrap();
//! let a = heap.allocate(100).unwrap();
//! let b = heap.allocate_zeroed(4, 25).unwrap();
//! assert!(heap.bytes(b).unwrap().iter().all(|&x| x == 0));
//!
//! heap.release(Some(a)).unwrap();
//! let stats = heap.statistics();
//! assert_eq!((stats.active_count, stats.total_count), (1, 2));
//! assert_eq!(stats.total_bytes, 200);
//!
//! // `b` is still live, so it shows up in the leak report.
//! let mut report = Vec::new();
//! heap.write_leak_report(&mut report).unwrap();
//! assert!(String::from_utf8(report).unwrap().starts_with("LEAK CHECK: "));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `heapward-arena` | `Heap`, `HeapConfig`, region directories, reports |
//! | [`types`] | `heapward-core` | Addresses, origins, statistics, error and mode enums |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The allocator itself (`heapward-arena`).
///
/// [`arena::Heap`] owns the arena and both region directories; build one
/// from an [`arena::HeapConfig`].
pub use heapward_arena as arena;

/// Addresses, origins, statistics, errors, and mode enums (`heapward-core`).
pub use heapward_core as types;

/// Common imports for typical Heapward usage.
///
/// ```rust
/// use heapward::prelude::*;
/// ```
pub mod prelude {
    // Heap and configuration
    pub use heapward_arena::{ArenaError, ConfigError, Heap, HeapConfig, LeakSite};

    // Core types
    pub use heapward_core::{Address, AllocStats, CursorPolicy, Origin, ReportingMode};

    // Errors
    pub use heapward_core::{AllocError, FreeError};
}

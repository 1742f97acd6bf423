//! Core types for the Heapward tracking allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the arena engine and the C bindings:
//! addresses, allocation origins, statistics counters, error types,
//! and the two behavioural knobs ([`ReportingMode`], [`CursorPolicy`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod mode;
pub mod stats;

pub use error::{AllocError, FreeError};
pub use id::{Address, Origin};
pub use mode::{CursorPolicy, ReportingMode};
pub use stats::AllocStats;

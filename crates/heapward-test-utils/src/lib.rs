//! Test utilities and workload generators for Heapward development.
//!
//! Provides [`check_invariants`], which asserts the directory and counter
//! invariants a heap must hold between operations, and a seeded
//! [`ChurnWorkload`] for driving long interleaved allocate/release runs.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod workload;

pub use fixtures::{check_invariants, silent_heap};
pub use workload::{ChurnWorkload, Op, Replay};

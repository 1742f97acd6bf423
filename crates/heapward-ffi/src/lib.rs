//! C FFI bindings for the Heapward tracking allocator.
//!
//! Exposes the `malloc`/`free`/`calloc` family plus statistics and leak
//! reporting over opaque `u64` heap handles. No Rust panic ever unwinds
//! across the boundary: every entry point is wrapped in `catch_unwind`
//! and reports [`HwStatus::Panicked`] (or a null pointer) instead.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `heapward-arena`); here it is limited to reading caller-provided C
//! strings and writing through caller-provided out-pointers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body` under `catch_unwind`, returning `$fallback` if it panics.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => $fallback,
        }
    };
}

/// Run a status-returning `$body` under `catch_unwind`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::HwStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning from the enclosing closure if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        ffi_lock!($mutex, $crate::status::HwStatus::InternalError as i32)
    };
    ($mutex:expr, $fallback:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $fallback,
        }
    };
}

mod handle;
pub mod heap;
pub mod status;
pub mod types;

pub use heap::{
    hw_calloc, hw_free, hw_get_statistics, hw_heap_create, hw_heap_destroy, hw_malloc,
    hw_print_leak_report, hw_print_statistics,
};
pub use status::HwStatus;
pub use types::{HwCursorPolicy, HwReportingMode, HwStatistics};

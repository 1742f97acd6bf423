//! C-compatible status codes.
//!
//! [`HwStatus`] is a `repr(i32)` enum covering every error condition a
//! status-returning entry point can report. Allocation failures are not
//! among them: `hw_malloc` and `hw_calloc` return null and count the
//! failure in the heap's statistics.

use heapward_arena::ArenaError;
use heapward_core::FreeError;

/// C-compatible status code returned by status-returning FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwStatus {
    /// Success.
    Ok = 0,
    /// Heap handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -2,
    /// Heap configuration failed validation.
    ConfigError = -3,
    /// The OS refused to map the arena.
    MapFailed = -4,
    /// The pointer was already released.
    DoubleFree = -5,
    /// The pointer was never returned by this heap.
    UnknownPointer = -6,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -7,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArenaError> for HwStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::Config(_) => HwStatus::ConfigError,
            ArenaError::MapFailed { .. } => HwStatus::MapFailed,
        }
    }
}

impl From<&FreeError> for HwStatus {
    fn from(e: &FreeError) -> Self {
        match e {
            FreeError::DoubleFree { .. } => HwStatus::DoubleFree,
            FreeError::UnknownPointer { .. } => HwStatus::UnknownPointer,
        }
    }
}

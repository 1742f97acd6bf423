//! Error types for allocation and release.
//!
//! Neither kind is fatal: a failed allocation is also visible as a null
//! result plus the `fail_*` counters, and an invalid release leaves the
//! heap untouched.

use std::error::Error;
use std::fmt;

use crate::id::Address;

/// Why an allocation request could not be satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// Neither bump space nor a large enough free region was available.
    Exhausted {
        /// Number of bytes requested.
        requested: usize,
    },
    /// The request was for `usize::MAX` bytes, which always fails.
    SentinelSize,
    /// `count * size` does not fit in a `usize`.
    MultiplyOverflow {
        /// Element count.
        count: usize,
        /// Element size in bytes.
        size: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { requested } => {
                write!(f, "heap exhausted: no room for {requested} bytes")
            }
            Self::SentinelSize => write!(f, "requested size is the maximum representable value"),
            Self::MultiplyOverflow { count, size } => {
                write!(f, "{count} elements of {size} bytes overflows usize")
            }
        }
    }
}

impl Error for AllocError {}

/// Why a release request was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreeError {
    /// The address was released before and has not been reallocated since.
    DoubleFree {
        /// The offending address.
        address: Address,
    },
    /// The address was never returned by this heap, or points inside an
    /// allocation rather than at its start.
    UnknownPointer {
        /// The offending address.
        address: Address,
    },
}

impl FreeError {
    /// The address the caller tried to release.
    pub fn address(&self) -> Address {
        match self {
            Self::DoubleFree { address } | Self::UnknownPointer { address } => *address,
        }
    }
}

impl fmt::Display for FreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleFree { address } => write!(f, "double free of {address}"),
            Self::UnknownPointer { address } => {
                write!(f, "release of {address}, which is not an active allocation")
            }
        }
    }
}

impl Error for FreeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_error_reports_address() {
        let e = FreeError::DoubleFree {
            address: Address(0x40),
        };
        assert_eq!(e.address(), Address(0x40));
        assert_eq!(e.to_string(), "double free of 0x40");
    }

    #[test]
    fn overflow_message_names_operands() {
        let e = AllocError::MultiplyOverflow { count: 3, size: 7 };
        assert!(e.to_string().contains("3 elements of 7 bytes"));
    }
}

//! Heap construction errors.

use std::error::Error;
use std::fmt;

use crate::config::ConfigError;

/// Errors that can occur while creating a [`Heap`](crate::Heap).
///
/// Once a heap exists, none of its operations fail with this type:
/// allocation failures are [`AllocError`](heapward_core::AllocError)
/// and invalid releases are [`FreeError`](heapward_core::FreeError).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The OS refused to map the arena.
    MapFailed {
        /// Number of bytes requested.
        capacity: usize,
        /// OS error code, if one was reported.
        errno: Option<i32>,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid heap config: {e}"),
            Self::MapFailed { capacity, errno } => match errno {
                Some(code) => write!(
                    f,
                    "failed to map {capacity}-byte arena (os error {code})"
                ),
                None => write!(f, "failed to map {capacity}-byte arena"),
            },
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::MapFailed { .. } => None,
        }
    }
}

impl From<ConfigError> for ArenaError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

//! Heap configuration parameters.

use std::error::Error;
use std::fmt;

use heapward_core::{CursorPolicy, ReportingMode};

/// Configuration for a [`Heap`](crate::Heap).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Size of the arena in bytes.
    ///
    /// Default: 8 MiB. Must be non-zero and a multiple of `alignment`.
    pub capacity: usize,

    /// Every bump allocation advances the cursor to a multiple of this.
    ///
    /// Default: 16. Must be a power of two.
    pub alignment: usize,

    /// What to do when asked to release an address that is not active.
    pub reporting_mode: ReportingMode,

    /// How the cursor reacts to releases.
    pub cursor_policy: CursorPolicy,
}

impl HeapConfig {
    /// Default arena size: 8 MiB.
    pub const DEFAULT_CAPACITY: usize = 8 << 20;

    /// Default cursor alignment in bytes.
    pub const DEFAULT_ALIGNMENT: usize = 16;

    /// Create a config for an arena of `capacity` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            alignment: Self::DEFAULT_ALIGNMENT,
            reporting_mode: ReportingMode::default(),
            cursor_policy: CursorPolicy::default(),
        }
    }

    /// Replace the reporting mode.
    pub fn with_reporting_mode(mut self, mode: ReportingMode) -> Self {
        self.reporting_mode = mode;
        self
    }

    /// Replace the cursor policy.
    pub fn with_cursor_policy(mut self, policy: CursorPolicy) -> Self {
        self.cursor_policy = policy;
        self
    }

    /// Replace the alignment.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > isize::MAX as usize {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
            });
        }
        if !self.alignment.is_power_of_two() {
            return Err(ConfigError::AlignmentNotPowerOfTwo {
                alignment: self.alignment,
            });
        }
        if self.capacity % self.alignment != 0 {
            return Err(ConfigError::CapacityNotAligned {
                capacity: self.capacity,
                alignment: self.alignment,
            });
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Errors detected during [`HeapConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity exceeds `isize::MAX` and cannot be addressed as one slice.
    CapacityTooLarge {
        /// The configured capacity.
        capacity: usize,
    },
    /// Alignment is zero or not a power of two.
    AlignmentNotPowerOfTwo {
        /// The configured alignment.
        alignment: usize,
    },
    /// Capacity is not a multiple of the alignment.
    CapacityNotAligned {
        /// The configured capacity.
        capacity: usize,
        /// The configured alignment.
        alignment: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "heap capacity must be non-zero"),
            Self::CapacityTooLarge { capacity } => {
                write!(f, "heap capacity {capacity} exceeds isize::MAX")
            }
            Self::AlignmentNotPowerOfTwo { alignment } => {
                write!(f, "alignment {alignment} is not a power of two")
            }
            Self::CapacityNotAligned {
                capacity,
                alignment,
            } => {
                write!(
                    f,
                    "heap capacity {capacity} is not a multiple of alignment {alignment}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

//! Addresses handed to callers and the source locations that requested them.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// An absolute address inside a heap's arena.
///
/// Addresses are what callers hold on to; internally the arena keys its
/// directories by offset from the arena base, and converts at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub usize);

impl Address {
    /// The raw address value.
    pub fn get(self) -> usize {
        self.0
    }

    /// Offset of this address from `base`, or `None` if it lies below it.
    pub fn offset_from(self, base: usize) -> Option<usize> {
        self.0.checked_sub(base)
    }

    /// Whether the address is a multiple of `alignment` (a power of two).
    pub fn is_aligned_to(self, alignment: usize) -> bool {
        self.0 & (alignment - 1) == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for Address {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Source location an allocation or release was requested from.
///
/// Metadata only: the allocation policy never looks at it. It is kept
/// alongside every active region so leak reports can name the site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    /// Source file, or `"?"` when unknown.
    pub file: Cow<'static, str>,
    /// Line number, or 0 when unknown.
    pub line: u32,
}

impl Origin {
    /// An origin with a static file name.
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self {
            file: Cow::Borrowed(file),
            line,
        }
    }

    /// An origin whose file name is owned (e.g. copied from a C string).
    pub fn owned(file: String, line: u32) -> Self {
        Self {
            file: Cow::Owned(file),
            line,
        }
    }

    /// Placeholder used when the caller supplied no location.
    pub const fn unknown() -> Self {
        Self::new("?", 0)
    }

    /// The location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self::new(loc.file(), loc.line())
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

//! C-compatible enums and the statistics struct.

use heapward_core::{AllocStats, CursorPolicy, ReportingMode};

use crate::status::HwStatus;

/// Invalid-release handling for `hw_heap_create`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwReportingMode {
    /// Return a status code only.
    Silent = 0,
    /// Also log a warning.
    ReportOnly = 1,
    /// Log and abort the process.
    AbortOnInvalidFree = 2,
}

impl TryFrom<i32> for HwReportingMode {
    type Error = HwStatus;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Silent),
            1 => Ok(Self::ReportOnly),
            2 => Ok(Self::AbortOnInvalidFree),
            _ => Err(HwStatus::InvalidArgument),
        }
    }
}

impl From<HwReportingMode> for ReportingMode {
    fn from(m: HwReportingMode) -> Self {
        match m {
            HwReportingMode::Silent => ReportingMode::Silent,
            HwReportingMode::ReportOnly => ReportingMode::ReportOnly,
            HwReportingMode::AbortOnInvalidFree => ReportingMode::AbortOnInvalidFree,
        }
    }
}

/// Cursor behaviour on release for `hw_heap_create`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwCursorPolicy {
    /// Cursor never moves backwards.
    Retain = 0,
    /// Cursor retreats only past the last block.
    Frontier = 1,
    /// Cursor decremented by the released size on every release.
    Unconditional = 2,
}

impl TryFrom<i32> for HwCursorPolicy {
    type Error = HwStatus;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Retain),
            1 => Ok(Self::Frontier),
            2 => Ok(Self::Unconditional),
            _ => Err(HwStatus::InvalidArgument),
        }
    }
}

impl From<HwCursorPolicy> for CursorPolicy {
    fn from(p: HwCursorPolicy) -> Self {
        match p {
            HwCursorPolicy::Retain => CursorPolicy::Retain,
            HwCursorPolicy::Frontier => CursorPolicy::Frontier,
            HwCursorPolicy::Unconditional => CursorPolicy::Unconditional,
        }
    }
}

/// C-compatible allocation statistics written by `hw_get_statistics`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HwStatistics {
    /// Number of currently active allocations.
    pub active_count: u64,
    /// Bytes in currently active allocations.
    pub active_bytes: u64,
    /// Number of successful allocations.
    pub total_count: u64,
    /// Bytes in successful allocations.
    pub total_bytes: u64,
    /// Number of failed allocation attempts.
    pub fail_count: u64,
    /// Bytes in failed allocation attempts.
    pub fail_bytes: u64,
    /// Lowest arena address.
    pub heap_min: usize,
    /// One past the highest arena address.
    pub heap_max: usize,
}

impl From<&AllocStats> for HwStatistics {
    fn from(s: &AllocStats) -> Self {
        Self {
            active_count: s.active_count,
            active_bytes: s.active_bytes,
            total_count: s.total_count,
            total_bytes: s.total_bytes,
            fail_count: s.fail_count,
            fail_bytes: s.fail_bytes,
            heap_min: s.heap_min,
            heap_max: s.heap_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_modes_round_trip() {
        for raw in 0..3 {
            assert_eq!(HwReportingMode::try_from(raw).unwrap() as i32, raw);
            assert_eq!(HwCursorPolicy::try_from(raw).unwrap() as i32, raw);
        }
        assert_eq!(
            HwReportingMode::try_from(3),
            Err(HwStatus::InvalidArgument)
        );
        assert_eq!(HwCursorPolicy::try_from(-1), Err(HwStatus::InvalidArgument));
    }

    #[test]
    fn statistics_copy_every_counter() {
        let stats = AllocStats {
            active_count: 1,
            active_bytes: 2,
            total_count: 3,
            total_bytes: 4,
            fail_count: 5,
            fail_bytes: 6,
            heap_min: 7,
            heap_max: 8,
        };
        let c = HwStatistics::from(&stats);
        assert_eq!(
            (c.active_count, c.total_bytes, c.fail_bytes, c.heap_max),
            (1, 4, 6, 8)
        );
    }
}

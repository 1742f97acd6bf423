//! Running allocation counters.

use std::fmt;

/// Snapshot of a heap's allocation counters.
///
/// Updated on every allocation attempt and every successful release.
/// `heap_min`/`heap_max` are the arena bounds and never change after
/// the heap is created.
///
/// Byte counters use wrapping arithmetic: a failed request for
/// `usize::MAX` bytes is first added to `total_bytes` and then rolled
/// back, and must leave the counter exactly where it was.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Number of currently active allocations.
    pub active_count: u64,
    /// Bytes in currently active allocations.
    pub active_bytes: u64,
    /// Number of successful allocations ever made.
    pub total_count: u64,
    /// Bytes in all successful allocations ever made.
    pub total_bytes: u64,
    /// Number of failed allocation attempts.
    pub fail_count: u64,
    /// Bytes in failed allocation attempts.
    pub fail_bytes: u64,
    /// Lowest address the arena can hand out.
    pub heap_min: usize,
    /// One past the highest address the arena can hand out.
    pub heap_max: usize,
}

impl AllocStats {
    /// Fresh counters for an arena spanning `[heap_min, heap_max)`.
    pub fn new(heap_min: usize, heap_max: usize) -> Self {
        Self {
            heap_min,
            heap_max,
            ..Self::default()
        }
    }

    /// Optimistically count an attempt of `size` bytes as a success.
    pub fn begin_attempt(&mut self, size: usize) {
        self.total_count = self.total_count.wrapping_add(1);
        self.total_bytes = self.total_bytes.wrapping_add(size as u64);
    }

    /// Confirm the attempt begun with [`begin_attempt`](Self::begin_attempt).
    pub fn record_success(&mut self, size: usize) {
        self.active_count += 1;
        self.active_bytes = self.active_bytes.wrapping_add(size as u64);
    }

    /// Roll back an attempt begun with [`begin_attempt`](Self::begin_attempt)
    /// and count it as a failure instead.
    pub fn record_failure(&mut self, size: usize) {
        self.total_count = self.total_count.wrapping_sub(1);
        self.total_bytes = self.total_bytes.wrapping_sub(size as u64);
        self.fail_count += 1;
        self.fail_bytes = self.fail_bytes.wrapping_add(size as u64);
    }

    /// Count a failure that was rejected before any attempt was begun.
    pub fn record_rejection(&mut self) {
        self.fail_count += 1;
    }

    /// Saturating decrement of the active count.
    pub fn release_one(&mut self) {
        self.active_count = self.active_count.saturating_sub(1);
    }

    /// Remove `size` bytes from the active byte total.
    pub fn release_bytes(&mut self, size: usize) {
        self.active_bytes = self.active_bytes.saturating_sub(size as u64);
    }
}

impl fmt::Display for AllocStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "alloc count: active {:10}   total {:10}   fail {:10}",
            self.active_count, self.total_count, self.fail_count
        )?;
        write!(
            f,
            "alloc size:  active {:10}   total {:10}   fail {:10}",
            self.active_bytes, self.total_bytes, self.fail_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_rolls_back_totals_exactly() {
        let mut stats = AllocStats::new(0x1000, 0x2000);
        stats.begin_attempt(55);
        stats.record_success(55);
        stats.begin_attempt(usize::MAX);
        stats.record_failure(usize::MAX);
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.total_bytes, 55);
        assert_eq!(stats.fail_count, 1);
        assert_eq!(stats.fail_bytes, usize::MAX as u64);
    }

    #[test]
    fn release_one_saturates_at_zero() {
        let mut stats = AllocStats::default();
        stats.release_one();
        assert_eq!(stats.active_count, 0);
    }

    #[test]
    fn display_matches_two_line_format() {
        let mut stats = AllocStats::default();
        stats.begin_attempt(1000);
        stats.record_success(1000);
        let text = stats.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "alloc count: active          1   total          1   fail          0"
        );
        assert_eq!(
            lines[1],
            "alloc size:  active       1000   total       1000   fail          0"
        );
    }

    #[test]
    fn bounds_are_kept() {
        let stats = AllocStats::new(16, 32);
        assert_eq!((stats.heap_min, stats.heap_max), (16, 32));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn failed_attempt_leaves_totals_unchanged(
                before in proptest::collection::vec(0usize..4096, 0..8),
                size in any::<usize>(),
            ) {
                let mut stats = AllocStats::default();
                for &s in &before {
                    stats.begin_attempt(s);
                    stats.record_success(s);
                }
                let snapshot = stats;
                stats.begin_attempt(size);
                stats.record_failure(size);
                prop_assert_eq!(stats.total_count, snapshot.total_count);
                prop_assert_eq!(stats.total_bytes, snapshot.total_bytes);
                prop_assert_eq!(stats.fail_count, snapshot.fail_count + 1);
                prop_assert_eq!(stats.active_count, snapshot.active_count);
            }
        }
    }
}

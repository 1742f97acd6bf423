//! Behavioural knobs selected when a heap is constructed.

/// What a heap does when asked to release an address it did not hand out.
///
/// Invalid releases never touch the directories or the byte counters.
/// The mode only governs how loudly the condition is surfaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReportingMode {
    /// Return the error to the caller and nothing else.
    Silent,
    /// Also emit a `log::warn!` record naming the address and origin.
    #[default]
    ReportOnly,
    /// Log at error level, then abort the process.
    AbortOnInvalidFree,
}

/// How the arena cursor reacts when an active region is released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorPolicy {
    /// The cursor never moves backwards. Freed space comes back only
    /// through the coalesce-and-reuse path, so releasing a block and then
    /// requesting one no larger returns the same address only once bump
    /// space is exhausted. Until then the request is bumped.
    #[default]
    Retain,
    /// The cursor retreats only when the released region is the last one
    /// before the cursor. Such a region is handed back to bump space
    /// instead of the free directory, and any free regions that then sit
    /// at the cursor are absorbed the same way.
    ///
    /// This is the policy with LIFO reuse: free the last block, ask for
    /// no more than its size, and the same address comes back even while
    /// bump space remains.
    Frontier,
    /// The cursor is decremented by the released size on every release,
    /// wherever the region lies. Only sound for strictly LIFO workloads:
    /// otherwise later bump allocations may overlap live regions.
    Unconditional,
}

use std::sync::atomic::{AtomicU64, Ordering};

/// How much of the server log has been shown for the current room.
///
/// Starts at 0 on every join and only ever moves forward.
#[derive(Debug, Default)]
pub struct PollCursor {
    observed: AtomicU64,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed(&self) -> u64 {
        self.observed.load(Ordering::Acquire)
    }

    /// Move to `count` if that is ahead of the current position. Returns the
    /// position after the call.
    pub fn advance_to(&self, count: u64) -> u64 {
        self.observed.fetch_max(count, Ordering::AcqRel).max(count)
    }
}

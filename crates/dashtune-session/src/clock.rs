//! Wall-clock position tracking for the session worker.

use std::time::Instant;

/// Pausable monotonic position counter.
///
/// Holds a base offset plus an optional running segment; the reported
/// position is the base plus however long the current segment has run.
#[derive(Debug)]
pub(crate) struct PositionClock {
    base_ms: u64,
    running_since: Option<Instant>,
}

impl PositionClock {
    pub(crate) fn new() -> Self {
        Self {
            base_ms: 0,
            running_since: None,
        }
    }

    /// Current position in milliseconds.
    pub(crate) fn position_ms(&self) -> u64 {
        let running = self
            .running_since
            .map(|since| since.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.base_ms.saturating_add(running)
    }

    /// Start advancing; no-op when already running.
    pub(crate) fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Freeze the position at its current value.
    pub(crate) fn pause(&mut self) {
        self.base_ms = self.position_ms();
        self.running_since = None;
    }

    /// Jump to a position, preserving the running/paused state.
    pub(crate) fn reset_to(&mut self, position_ms: u64) {
        let was_running = self.running_since.is_some();
        self.base_ms = position_ms;
        self.running_since = was_running.then(Instant::now);
    }
}

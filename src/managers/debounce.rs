//! Deadline bookkeeping for debounced writes.
//!
//! Owns at most one pending deadline. Every `schedule` replaces the previous
//! one, so a burst of changes collapses into a single write once the quiet
//! period has elapsed. The owner polls `take_due` from its event loop.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DebouncedFlush {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebouncedFlush {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arms the deadline `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns true if the deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

//! Single-slot commit debounce.

use std::time::{Duration, Instant};

/// One pending deadline per form. Scheduling again cancels and reschedules,
/// so a burst of commits collapses into a single notification.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending deadline and sets a new one `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.deadline = Some(deadline);
        deadline
    }

    /// Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clears and returns true once `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

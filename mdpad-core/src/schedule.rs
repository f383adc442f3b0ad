//! Poll-driven debounce timer

use std::time::{Duration, Instant};

/// A cancellable delayed trigger.
///
/// Each [`Debouncer::touch`] resets the deadline. [`Debouncer::fire`] returns
/// true exactly once after the quiet period has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_touch: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_touch: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer at `now`
    pub fn touch(&mut self, now: Instant) {
        self.last_touch = Some(now);
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.last_touch = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_touch.is_some()
    }

    /// Returns true if armed and the delay has elapsed by `now`; disarms on fire
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_touch {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_touch = None;
                true
            }
            _ => false,
        }
    }
}

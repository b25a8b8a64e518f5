//! Quiet-period debouncing for rapidly changing input.
//!
//! `Debouncer` is a two-state machine driven by the caller's clock:
//! *settled* (output equals the latest input) and *pending* (a deadline is
//! armed). Every `update` replaces the pending value and re-arms the
//! deadline, so a burst of updates yields one output, `delay` after the last
//! one. The event loop calls `poll` and can use `time_until_due` as its wait
//! timeout to emit exactly on time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    value: T,
    pending: Option<(T, Instant)>,
    delay: Duration,
}

impl<T> Debouncer<T> {
    /// Start settled on `initial`; no timer runs for the initial value.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            value: initial,
            pending: None,
            delay,
        }
    }

    /// Current (debounced) output
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Latest input, which may not have been emitted yet
    pub fn latest(&self) -> &T {
        self.pending.as_ref().map(|(v, _)| v).unwrap_or(&self.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a new input at `now`, cancelling any pending emission.
    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Emit the pending value if its deadline has passed.
    /// Returns true when the output changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending.take() {
            Some((value, due)) if now >= due => {
                self.value = value;
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Time left before the pending value is due, or `None` when settled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, due)| due.saturating_duration_since(now))
    }

    /// Apply `value` immediately, dropping any pending emission.
    pub fn set_now(&mut self, value: T) {
        self.pending = None;
        self.value = value;
    }
}

//! Debounce and throttle helpers.
//!
//! Neither type owns a timer. [`Debounce`] hands out tokens the caller passes
//! back when its timer fires; only the most recent token is still live.
//! [`Throttle`] compares against the last accepted instant.

use std::time::Duration;
use web_time::Instant;

/// Token identifying one scheduled debounce firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceToken(u64);

/// Trailing-edge debounce.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    latest: u64,
    pending: bool,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: 0,
            pending: false,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a new trigger. Any earlier token becomes stale.
    pub fn trigger(&mut self) -> DebounceToken {
        self.latest = self.latest.wrapping_add(1);
        self.pending = true;
        DebounceToken(self.latest)
    }

    /// Called when the timer for `token` fires. Returns true if this firing
    /// should run the debounced action.
    pub fn fire(&mut self, token: DebounceToken) -> bool {
        if self.pending && token.0 == self.latest {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Leading-edge throttle.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Returns true and records `now` if at least one interval has elapsed
    /// since the last accepted call.
    pub fn allow(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

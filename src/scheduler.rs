//! Timer scheduling.
//!
//! Components never own a timer. They ask the [`Scheduler`] for one and the
//! host hands the [`Timer`] back to [`crate::app::Frontend::on_timer`] once it
//! fires.

use std::cell::RefCell;
use std::time::Duration;

use cg_ui::DebounceToken;

/// Handle of a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    /// Next push channel connection attempt
    Reconnect,
    /// Refresh of the loading overlay's elapsed-time counter
    LoadingTick,
    /// Debounced input of the tag editor attached to `input`
    SuggestInput { input: String, token: DebounceToken },
    /// Debounced search text of the dropdown in `container`
    DropdownSearch {
        container: String,
        token: DebounceToken,
    },
}

/// One-shot timer service.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, timer: Timer) -> TimerId;
    fn cancel(&self, id: TimerId);
}

/// Scheduler that only records requests; the owner decides when timers
/// fire. Used by tests and the native monitor loop.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    inner: RefCell<ManualInner>,
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    pending: Vec<(TimerId, Duration, Timer)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> Vec<(TimerId, Duration, Timer)> {
        self.inner.borrow().pending.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Remove and return the oldest pending timer.
    pub fn pop(&self) -> Option<(TimerId, Duration, Timer)> {
        let mut inner = self.inner.borrow_mut();
        if inner.pending.is_empty() {
            None
        } else {
            Some(inner.pending.remove(0))
        }
    }

    /// Remove and return the oldest pending timer matching `pred`.
    pub fn take_first(&self, pred: impl Fn(&Timer) -> bool) -> Option<Timer> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.pending.iter().position(|(_, _, t)| pred(t))?;
        Some(inner.pending.remove(index).2)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, timer: Timer) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        inner.pending.push((id, delay, timer));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.inner.borrow_mut().pending.retain(|(pending, _, _)| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler() {
        let scheduler = ManualScheduler::new();
        let a = scheduler.schedule(Duration::from_millis(500), Timer::Reconnect);
        let b = scheduler.schedule(Duration::from_millis(100), Timer::LoadingTick);
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count(), 2);

        scheduler.cancel(a);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(
            scheduler.take_first(|t| *t == Timer::LoadingTick),
            Some(Timer::LoadingTick)
        );
        assert!(scheduler.pop().is_none());
    }
}

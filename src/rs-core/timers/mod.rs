use crate::bindings::{TimerId, TimerReason};

/// Time-related capabilities of the host's event loop.
///
/// Every timer is one-shot: once elapsed, the host calls back the `Dispatcher`'s
/// `on_timer_ended` method with the `TimerId` and `TimerReason` given here.
pub trait Scheduler {
    /// Monotonic timestamp, in milliseconds.
    fn now(&self) -> f64;

    /// Start a timer of `duration_ms` milliseconds.
    fn start_timer(&self, duration_ms: f64, reason: TimerReason) -> TimerId;

    /// Cancel a timer started through `start_timer`. Its expiration will never be reported.
    fn clear_timer(&self, id: TimerId);
}

/// Slot holding at most one pending timer for a given purpose.
///
/// Arming it again replaces (and clears) the previous timer, so a component can never
/// have two concurrent timers for the same reason.
#[derive(Debug)]
pub(crate) struct Timer {
    reason: TimerReason,
    pending: Option<TimerId>,
}

impl Timer {
    pub(crate) fn new(reason: TimerReason) -> Self {
        Self {
            reason,
            pending: None,
        }
    }

    /// Start the timer, clearing the previous one if it was still pending.
    pub(crate) fn arm(&mut self, scheduler: &dyn Scheduler, duration_ms: f64) {
        self.cancel(scheduler);
        self.pending = Some(scheduler.start_timer(duration_ms, self.reason));
    }

    /// Clear the timer if one is pending. Does nothing otherwise.
    pub(crate) fn cancel(&mut self, scheduler: &dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.clear_timer(id);
        }
    }

    /// Consume the pending timer if `id` designates it.
    ///
    /// Returns `false` for unknown or already-cancelled timers, whose expiration should then
    /// be ignored.
    pub(crate) fn fire(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

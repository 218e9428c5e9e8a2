use crate::{
    bindings::{TimerId, TimerReason},
    timers::{Scheduler, Timer},
    utils::time_ranges::TimeRanges,
    Logger,
};

/// Action to perform to get out of a stall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StallAction {
    /// The position is before a buffered range: jump to its start.
    SkipBufferHole { to: f64 },

    /// The position is right before the end of its buffered range: jump a little forward.
    Nudge { to: f64 },

    /// Ask the adaptive client to reload segments from `from`.
    RestartLoad { from: f64 },
}

/// Detects stalls reported by the media element and tries to recover from them locally.
///
/// Recovery attempts are spaced by a cooldown and only performed after a grace delay, to let
/// regular buffering resolve the situation by itself first. A stall reported during the
/// cooldown is checked again once it ends.
pub(crate) struct StallRecoveryMonitor {
    /// Minimum delay between two recovery attempts, in milliseconds.
    cooldown_ms: f64,

    /// Delay awaited after a stall before recovering, in milliseconds.
    grace_ms: f64,

    /// Maximum forward jump when crossing a small gap, in seconds.
    nudge_seconds: f64,

    /// Timestamp of the last recovery actually performed.
    last_recovery: Option<f64>,

    grace_timer: Timer,
}

impl StallRecoveryMonitor {
    pub(crate) fn new(cooldown_ms: f64, grace_ms: f64, nudge_seconds: f64) -> Self {
        Self {
            cooldown_ms,
            grace_ms,
            nudge_seconds,
            last_recovery: None,
            grace_timer: Timer::new(TimerReason::StallGrace),
        }
    }

    pub(crate) fn configure(&mut self, cooldown_ms: f64, grace_ms: f64, nudge_seconds: f64) {
        self.cooldown_ms = cooldown_ms;
        self.grace_ms = grace_ms;
        self.nudge_seconds = nudge_seconds;
    }

    /// Method to call when the media element reported a stall.
    ///
    /// Returns `false` if a recovery check was already scheduled.
    pub(crate) fn on_stall(&mut self, scheduler: &dyn Scheduler) -> bool {
        if self.grace_timer.is_pending() {
            Logger::debug("Stall: Recovery already scheduled");
            return false;
        }
        let now = scheduler.now();
        let cooldown_end = self
            .last_recovery
            .map_or(now, |last| last + self.cooldown_ms);
        let delay = (cooldown_end - now).max(self.grace_ms);
        if delay > self.grace_ms {
            Logger::lazy_debug(&|| format!("Stall: In cooldown, checking again in {delay}ms"));
        } else {
            Logger::lazy_info(&|| format!("Stall: Scheduling recovery in {delay}ms"));
        }
        self.grace_timer.arm(scheduler, delay);
        true
    }

    /// Method to call when playback resumed, the pending recovery is not needed anymore.
    pub(crate) fn on_playback_resumed(&mut self, scheduler: &dyn Scheduler) {
        if self.grace_timer.is_pending() {
            Logger::debug("Stall: Playback resumed by itself");
            self.grace_timer.cancel(scheduler);
        }
    }

    /// Method to call once a `StallGrace` timer elapsed.
    ///
    /// `still_stalled` indicates if the media element is still waiting for data. `position`
    /// and `buffered` should have been read right before this call.
    pub(crate) fn on_grace_elapsed(
        &mut self,
        id: TimerId,
        now: f64,
        still_stalled: bool,
        position: f64,
        buffered: &TimeRanges,
    ) -> Option<StallAction> {
        if !self.grace_timer.fire(id) || !still_stalled {
            return None;
        }
        self.last_recovery = Some(now);
        let action = recovery_action(position, buffered, self.nudge_seconds);
        Logger::lazy_info(&|| format!("Stall: Recovering at {position} with {action:?}"));
        Some(action)
    }

    /// Cancel any pending recovery and forget the cooldown.
    pub(crate) fn reset(&mut self, scheduler: &dyn Scheduler) {
        self.grace_timer.cancel(scheduler);
        self.last_recovery = None;
    }
}

/// Choose how to get out of a stall at `position`.
fn recovery_action(position: f64, buffered: &TimeRanges, nudge_seconds: f64) -> StallAction {
    match buffered.range_for(position) {
        None => match buffered.next_range_after(position) {
            Some(next) => StallAction::SkipBufferHole { to: next.start() },
            None => StallAction::RestartLoad { from: position },
        },
        Some(range) if range.end() - position <= nudge_seconds => StallAction::Nudge {
            to: (position + nudge_seconds).min(range.end()),
        },
        Some(_) => StallAction::RestartLoad { from: position },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockHost;

    fn monitor() -> StallRecoveryMonitor {
        StallRecoveryMonitor::new(3000., 1000., 0.5)
    }

    #[test]
    fn test_skip_buffer_hole() {
        let buffered = TimeRanges::from_flat(&[0., 4., 6., 20.]);
        assert_eq!(
            recovery_action(4.2, &buffered, 0.5),
            StallAction::SkipBufferHole { to: 6. }
        );
    }

    #[test]
    fn test_nudge_near_range_end() {
        let buffered = TimeRanges::from_flat(&[0., 10.]);
        assert_eq!(
            recovery_action(9.8, &buffered, 0.5),
            StallAction::Nudge { to: 10. }
        );
        assert_eq!(
            recovery_action(9.5, &buffered, 0.5),
            StallAction::Nudge { to: 10. }
        );
    }

    #[test]
    fn test_restart_load_otherwise() {
        let buffered = TimeRanges::from_flat(&[0., 10.]);
        assert_eq!(
            recovery_action(3., &buffered, 0.5),
            StallAction::RestartLoad { from: 3. }
        );
        assert_eq!(
            recovery_action(12., &buffered, 0.5),
            StallAction::RestartLoad { from: 12. }
        );
        assert_eq!(
            recovery_action(0., &TimeRanges::new(), 0.5),
            StallAction::RestartLoad { from: 0. }
        );
    }

    /// Perform one recovery, returning the timestamp at which it happened.
    fn recover(monitor: &mut StallRecoveryMonitor, host: &MockHost) -> f64 {
        assert!(monitor.on_stall(host));
        let expired = host.advance(1000.);
        assert!(monitor
            .on_grace_elapsed(expired[0].0, host.now(), true, 2., &TimeRanges::new())
            .is_some());
        host.now()
    }

    #[test]
    fn test_cooldown_defers_next_recovery() {
        let host = MockHost::new();
        let mut monitor = monitor();
        let recovered_at = recover(&mut monitor, &host);

        host.advance(500.);
        assert!(monitor.on_stall(&host));
        assert!(!monitor.on_stall(&host));
        assert_eq!(host.timers_started(TimerReason::StallGrace), 2);
        assert!(host.advance(2499.).is_empty());
        let expired = host.advance(1.);
        assert_eq!(host.now() - recovered_at, 3000.);
        assert_eq!(
            monitor.on_grace_elapsed(expired[0].0, host.now(), true, 2., &TimeRanges::new()),
            Some(StallAction::RestartLoad { from: 2. })
        );
    }

    #[test]
    fn test_grace_used_once_cooldown_ended() {
        let host = MockHost::new();
        let mut monitor = monitor();
        recover(&mut monitor, &host);
        host.advance(3000.);
        assert!(monitor.on_stall(&host));
        assert!(host.advance(999.).is_empty());
        assert_eq!(host.advance(1.).len(), 1);
    }

    #[test]
    fn test_resolved_stall_does_not_start_cooldown() {
        let host = MockHost::new();
        let mut monitor = monitor();
        monitor.on_stall(&host);
        monitor.on_playback_resumed(&host);
        host.advance(200.);
        assert!(monitor.on_stall(&host));
        assert!(host.advance(999.).is_empty());
        assert_eq!(host.advance(1.).len(), 1);
    }

    #[test]
    fn test_recovery_after_grace() {
        let host = MockHost::new();
        let mut monitor = monitor();
        monitor.on_stall(&host);
        let id = host.last_timer_id().unwrap();
        let buffered = TimeRanges::from_flat(&[5., 30.]);
        assert_eq!(
            monitor.on_grace_elapsed(id, 0., true, 2., &buffered),
            Some(StallAction::SkipBufferHole { to: 5. })
        );
        assert_eq!(monitor.on_grace_elapsed(id, 0., true, 2., &buffered), None);
    }

    #[test]
    fn test_resumed_playback_cancels_recovery() {
        let host = MockHost::new();
        let mut monitor = monitor();
        monitor.on_stall(&host);
        let id = host.last_timer_id().unwrap();
        monitor.on_playback_resumed(&host);
        assert_eq!(host.pending_timer_count(), 0);
        assert_eq!(
            monitor.on_grace_elapsed(id, 0., true, 2., &TimeRanges::new()),
            None
        );
    }

    #[test]
    fn test_no_action_if_no_longer_stalled() {
        let host = MockHost::new();
        let mut monitor = monitor();
        monitor.on_stall(&host);
        let id = host.last_timer_id().unwrap();
        assert_eq!(
            monitor.on_grace_elapsed(id, 0., false, 2., &TimeRanges::new()),
            None
        );
    }
}

use crate::{
    bindings::{TimerId, TimerReason},
    timers::{Scheduler, Timer},
};

/// Hides the controls after a period without pointer activity during playback.
///
/// Controls stay visible while paused and while a volume or settings submenu is open.
pub(crate) struct IdleHider {
    idle_ms: f64,
    visible: bool,
    submenu_open: bool,
    timer: Timer,
}

impl IdleHider {
    pub(crate) fn new(idle_ms: f64) -> Self {
        Self {
            idle_ms,
            visible: true,
            submenu_open: false,
            timer: Timer::new(TimerReason::ControlsIdle),
        }
    }

    pub(crate) fn set_idle_delay(&mut self, idle_ms: f64) {
        self.idle_ms = idle_ms;
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    /// Method to call on any pointer movement or when the pointer enters the player.
    ///
    /// Returns the new visibility if it changed.
    pub(crate) fn on_activity(
        &mut self,
        is_playing: bool,
        scheduler: &dyn Scheduler,
    ) -> Option<bool> {
        if is_playing {
            self.timer.arm(scheduler, self.idle_ms);
        }
        self.set_visible(true)
    }

    /// Method to call when playback started or stopped.
    pub(crate) fn on_playing_change(
        &mut self,
        is_playing: bool,
        scheduler: &dyn Scheduler,
    ) -> Option<bool> {
        if is_playing {
            if !self.timer.is_pending() {
                self.timer.arm(scheduler, self.idle_ms);
            }
            None
        } else {
            self.timer.cancel(scheduler);
            self.set_visible(true)
        }
    }

    /// Method to call when a volume or settings submenu is opened or closed.
    pub(crate) fn set_submenu_open(
        &mut self,
        open: bool,
        is_playing: bool,
        scheduler: &dyn Scheduler,
    ) -> Option<bool> {
        self.submenu_open = open;
        if open {
            self.timer.cancel(scheduler);
            self.set_visible(true)
        } else {
            self.on_activity(is_playing, scheduler)
        }
    }

    /// Method to call once a `ControlsIdle` timer elapsed.
    pub(crate) fn on_idle_elapsed(&mut self, id: TimerId, is_playing: bool) -> Option<bool> {
        if !self.timer.fire(id) || !is_playing || self.submenu_open {
            return None;
        }
        self.set_visible(false)
    }

    pub(crate) fn reset(&mut self, scheduler: &dyn Scheduler) {
        self.timer.cancel(scheduler);
        self.submenu_open = false;
        self.visible = true;
    }

    fn set_visible(&mut self, visible: bool) -> Option<bool> {
        if self.visible == visible {
            None
        } else {
            self.visible = visible;
            Some(visible)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockHost;

    #[test]
    fn test_hides_after_idle_while_playing() {
        let host = MockHost::new();
        let mut idle = IdleHider::new(3000.);
        assert_eq!(idle.on_playing_change(true, &host), None);
        let expired = host.advance(3000.);
        assert_eq!(idle.on_idle_elapsed(expired[0].0, true), Some(false));
        assert!(!idle.is_visible());
        assert_eq!(idle.on_activity(true, &host), Some(true));
    }

    #[test]
    fn test_activity_resets_idle_timer() {
        let host = MockHost::new();
        let mut idle = IdleHider::new(3000.);
        idle.on_playing_change(true, &host);
        host.advance(2000.);
        idle.on_activity(true, &host);
        assert!(host.advance(2000.).is_empty());
        let expired = host.advance(1000.);
        assert_eq!(idle.on_idle_elapsed(expired[0].0, true), Some(false));
    }

    #[test]
    fn test_submenu_keeps_controls_visible() {
        let host = MockHost::new();
        let mut idle = IdleHider::new(3000.);
        idle.on_playing_change(true, &host);
        let id = host.last_timer_id().unwrap();
        idle.set_submenu_open(true, true, &host);
        assert_eq!(idle.on_idle_elapsed(id, true), None);
        assert!(idle.is_visible());
        assert_eq!(host.pending_timer_count(), 0);
    }

    #[test]
    fn test_pause_shows_controls() {
        let host = MockHost::new();
        let mut idle = IdleHider::new(3000.);
        idle.on_playing_change(true, &host);
        let expired = host.advance(3000.);
        idle.on_idle_elapsed(expired[0].0, true);
        assert_eq!(idle.on_playing_change(false, &host), Some(true));
        assert_eq!(host.pending_timer_count(), 0);
    }
}

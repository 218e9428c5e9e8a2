use crate::{
    bindings::{SeekIndicator, TimerId, TimerReason},
    timers::{Scheduler, Timer},
    Logger,
};

/// Side of the surface a double tap happened on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeekDirection {
    Backward,
    Forward,
}

impl SeekDirection {
    /// Left half seeks backward, right half seeks forward.
    pub(crate) fn from_tap(x: f64, container_width: f64) -> Self {
        if x < container_width / 2. {
            SeekDirection::Backward
        } else {
            SeekDirection::Forward
        }
    }
}

impl From<SeekDirection> for SeekIndicator {
    fn from(direction: SeekDirection) -> Self {
        match direction {
            SeekDirection::Backward => SeekIndicator::Backward,
            SeekDirection::Forward => SeekIndicator::Forward,
        }
    }
}

/// Outcome of a tap sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TapGesture {
    SingleTap,
    DoubleTap(SeekDirection),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TapState {
    Idle,
    AwaitingSecondTap,
}

/// Data about the tap sequence in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct GestureState {
    pub(crate) last_tap_timestamp: Option<f64>,
    pub(crate) tap_count: u32,
    pub(crate) pending_seek_direction: Option<SeekDirection>,
}

/// Tells single taps and double taps apart.
///
/// A first tap opens a window: a second tap inside it resolves as a double tap right away,
/// while the window expiring with a single tap resolves as a single tap.
pub(crate) struct TapResolver {
    window_ms: f64,
    state: TapState,
    gesture: GestureState,
    window_timer: Timer,
}

impl TapResolver {
    pub(crate) fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            state: TapState::Idle,
            gesture: GestureState::default(),
            window_timer: Timer::new(TimerReason::TapWindow),
        }
    }

    pub(crate) fn set_window(&mut self, window_ms: f64) {
        self.window_ms = window_ms;
    }

    pub(crate) fn gesture_state(&self) -> &GestureState {
        &self.gesture
    }

    /// Method to call on each tap, at horizontal coordinate `x` of a container of width
    /// `container_width`.
    ///
    /// Returns the gesture resolved by this tap, if one.
    pub(crate) fn on_tap(
        &mut self,
        x: f64,
        container_width: f64,
        scheduler: &dyn Scheduler,
    ) -> Option<TapGesture> {
        let now = scheduler.now();
        let direction = SeekDirection::from_tap(x, container_width);
        match self.state {
            TapState::AwaitingSecondTap if self.is_within_window(now) => {
                self.gesture.tap_count += 1;
                self.gesture.pending_seek_direction = Some(direction);
                Logger::lazy_debug(&|| format!("Gesture: Double tap ({direction:?})"));
                self.clear(scheduler);
                Some(TapGesture::DoubleTap(direction))
            }
            TapState::AwaitingSecondTap => {
                // The window expired but its timer was not processed yet: the previous tap
                // was a single one and this tap opens a new window.
                self.clear(scheduler);
                self.start_window(now, direction, scheduler);
                Some(TapGesture::SingleTap)
            }
            TapState::Idle => {
                self.start_window(now, direction, scheduler);
                None
            }
        }
    }

    /// Method to call once a `TapWindow` timer elapsed.
    pub(crate) fn on_window_elapsed(&mut self, id: TimerId) -> Option<TapGesture> {
        if !self.window_timer.fire(id) || self.state != TapState::AwaitingSecondTap {
            return None;
        }
        self.state = TapState::Idle;
        self.gesture = GestureState::default();
        Some(TapGesture::SingleTap)
    }

    /// Drop the tap sequence in progress, if one.
    pub(crate) fn clear(&mut self, scheduler: &dyn Scheduler) {
        self.window_timer.cancel(scheduler);
        self.state = TapState::Idle;
        self.gesture = GestureState::default();
    }

    fn start_window(&mut self, now: f64, direction: SeekDirection, scheduler: &dyn Scheduler) {
        self.state = TapState::AwaitingSecondTap;
        self.gesture = GestureState {
            last_tap_timestamp: Some(now),
            tap_count: 1,
            pending_seek_direction: Some(direction),
        };
        self.window_timer.arm(scheduler, self.window_ms);
    }

    fn is_within_window(&self, now: f64) -> bool {
        self.gesture
            .last_tap_timestamp
            .map_or(false, |last| now - last <= self.window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockHost;

    #[test]
    fn test_double_tap() {
        let host = MockHost::new();
        let mut taps = TapResolver::new(300.);
        assert_eq!(taps.on_tap(100., 1000., &host), None);
        assert_eq!(taps.gesture_state().tap_count, 1);
        host.advance(150.);
        assert_eq!(
            taps.on_tap(120., 1000., &host),
            Some(TapGesture::DoubleTap(SeekDirection::Backward))
        );
        assert_eq!(taps.gesture_state(), &GestureState::default());
        assert_eq!(host.pending_timer_count(), 0);
    }

    #[test]
    fn test_double_tap_uses_second_tap_side() {
        let host = MockHost::new();
        let mut taps = TapResolver::new(300.);
        taps.on_tap(100., 1000., &host);
        assert_eq!(
            taps.on_tap(900., 1000., &host),
            Some(TapGesture::DoubleTap(SeekDirection::Forward))
        );
    }

    #[test]
    fn test_single_tap_on_window_expiration() {
        let host = MockHost::new();
        let mut taps = TapResolver::new(300.);
        taps.on_tap(100., 1000., &host);
        let expired = host.advance(300.);
        assert_eq!(expired.len(), 1);
        assert_eq!(taps.on_window_elapsed(expired[0].0), Some(TapGesture::SingleTap));
        assert_eq!(taps.on_window_elapsed(expired[0].0), None);
    }

    #[test]
    fn test_late_second_tap_starts_new_sequence() {
        let host = MockHost::new();
        let mut taps = TapResolver::new(300.);
        taps.on_tap(100., 1000., &host);
        host.set_now(host.now() + 400.);
        assert_eq!(taps.on_tap(100., 1000., &host), Some(TapGesture::SingleTap));
        assert_eq!(taps.gesture_state().tap_count, 1);
    }

    #[test]
    fn test_cleared_window_never_resolves() {
        let host = MockHost::new();
        let mut taps = TapResolver::new(300.);
        taps.on_tap(100., 1000., &host);
        let id = host.last_timer_id().unwrap();
        taps.clear(&host);
        assert_eq!(taps.on_window_elapsed(id), None);
        assert_eq!(host.pending_timer_count(), 0);
    }
}

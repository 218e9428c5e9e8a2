use self::{
    gesture::{TapGesture, TapResolver},
    idle::IdleHider,
};
use crate::{
    bindings::{SeekIndicator, TimerId, TimerReason},
    dispatcher::PlayerEvents,
    media_session::PlaybackState,
    timers::{Scheduler, Timer},
    utils::clamp_f64,
    Logger,
};

pub(crate) use gesture::SeekDirection;

mod gesture;
mod idle;

/// Playback speeds offered to the user.
pub(crate) const PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1., 1.25, 1.5, 2.];

/// Command the control surface asks the `MediaSession` to perform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ControlCommand {
    TogglePlay,
    Play,
    Pause,
    SeekTo(f64),
    SeekBy(f64),
    SetVolume(f64),
    SetMuted(bool),
}

/// Turns pointer and touch input into player commands and drives the transient feedback
/// (controls visibility, seek indicator, fullscreen).
///
/// It knows nothing about streaming: everything it needs about playback is given to it.
pub(crate) struct ControlSurface {
    /// Amount of seconds a double tap seeks by.
    seek_amount_seconds: f64,

    /// How long the double tap indicator stays displayed, in milliseconds.
    indicator_ms: f64,

    taps: TapResolver,
    idle: IdleHider,
    indicator_timer: Timer,

    /// Set while a progress bar interaction paused playback.
    was_playing_before_scrub: bool,

    /// Set when playback has to be resumed on the next completed seek.
    resume_after_seek: bool,

    fullscreen: bool,

    /// Volume to restore when unmuting a player whose volume was brought to `0`.
    volume_before_mute: f64,
}

impl ControlSurface {
    pub(crate) fn new(
        seek_amount_seconds: f64,
        tap_window_ms: f64,
        indicator_ms: f64,
        idle_ms: f64,
    ) -> Self {
        Self {
            seek_amount_seconds,
            indicator_ms,
            taps: TapResolver::new(tap_window_ms),
            idle: IdleHider::new(idle_ms),
            indicator_timer: Timer::new(TimerReason::SeekIndicator),
            was_playing_before_scrub: false,
            resume_after_seek: false,
            fullscreen: false,
            volume_before_mute: 1.,
        }
    }

    pub(crate) fn configure(
        &mut self,
        seek_amount_seconds: f64,
        tap_window_ms: f64,
        indicator_ms: f64,
        idle_ms: f64,
    ) {
        self.seek_amount_seconds = seek_amount_seconds;
        self.indicator_ms = indicator_ms;
        self.taps.set_window(tap_window_ms);
        self.idle.set_idle_delay(idle_ms);
    }

    pub(crate) fn controls_visible(&self) -> bool {
        self.idle.is_visible()
    }

    pub(crate) fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Method to call on each tap on the video surface.
    pub(crate) fn on_tap(
        &mut self,
        x: f64,
        container_width: f64,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) -> Option<ControlCommand> {
        let gesture = self.taps.on_tap(x, container_width, scheduler)?;
        Some(self.on_gesture(gesture, scheduler, events))
    }

    /// Method to call once a `TapWindow` timer elapsed.
    pub(crate) fn on_tap_window_elapsed(
        &mut self,
        id: TimerId,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) -> Option<ControlCommand> {
        let gesture = self.taps.on_window_elapsed(id)?;
        Some(self.on_gesture(gesture, scheduler, events))
    }

    /// Method to call once a `SeekIndicator` timer elapsed.
    pub(crate) fn on_indicator_elapsed(&mut self, id: TimerId, events: &dyn PlayerEvents) {
        if self.indicator_timer.fire(id) {
            events.on_seek_indicator(SeekIndicator::Hidden);
        }
    }

    /// Method to call when the pointer is pressed on the progress bar.
    pub(crate) fn on_progress_bar_press(&mut self, is_playing: bool) -> Option<ControlCommand> {
        self.was_playing_before_scrub = is_playing;
        if is_playing {
            Some(ControlCommand::Pause)
        } else {
            None
        }
    }

    /// Method to call when a click or a drag on the progress bar ends.
    ///
    /// If playback was active before the interaction, it will be resumed once the seek
    /// completed (see `on_seek_completed`), or right away when no seek can be performed.
    pub(crate) fn on_progress_bar_release(
        &mut self,
        pointer_x: f64,
        bar_left: f64,
        bar_width: f64,
        duration: f64,
        is_playing: bool,
    ) -> Option<ControlCommand> {
        let was_playing = std::mem::take(&mut self.was_playing_before_scrub) || is_playing;
        if !(duration > 0.) {
            return if was_playing {
                Some(ControlCommand::Play)
            } else {
                None
            };
        }
        let target = scrub_ratio(pointer_x, bar_left, bar_width) * duration;
        Logger::lazy_debug(&|| format!("Controls: Scrubbing to {target}"));
        self.resume_after_seek = was_playing;
        Some(ControlCommand::SeekTo(target))
    }

    /// Method to call when a seek completed.
    pub(crate) fn on_seek_completed(&mut self) -> Option<ControlCommand> {
        if std::mem::take(&mut self.resume_after_seek) {
            Some(ControlCommand::Play)
        } else {
            None
        }
    }

    /// Method to call on any pointer movement over the player.
    pub(crate) fn on_pointer_activity(
        &mut self,
        is_playing: bool,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) {
        if let Some(visible) = self.idle.on_activity(is_playing, scheduler) {
            events.on_controls_visibility_change(visible);
        }
    }

    /// Method to call each time the playback state changed.
    pub(crate) fn on_playback_state_change(
        &mut self,
        state: &PlaybackState,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) {
        if let Some(visible) = self.idle.on_playing_change(state.is_playing, scheduler) {
            events.on_controls_visibility_change(visible);
        }
        if state.volume > 0. {
            self.volume_before_mute = state.volume;
        }
    }

    /// Method to call once a `ControlsIdle` timer elapsed.
    pub(crate) fn on_idle_elapsed(
        &mut self,
        id: TimerId,
        is_playing: bool,
        events: &dyn PlayerEvents,
    ) {
        if let Some(visible) = self.idle.on_idle_elapsed(id, is_playing) {
            events.on_controls_visibility_change(visible);
        }
    }

    pub(crate) fn set_submenu_open(
        &mut self,
        open: bool,
        is_playing: bool,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) {
        if let Some(visible) = self.idle.set_submenu_open(open, is_playing, scheduler) {
            events.on_controls_visibility_change(visible);
        }
    }

    /// Commands toggling the muted state. Unmuting a player at volume `0` restores the last
    /// audible volume.
    pub(crate) fn toggle_mute(&mut self, state: &PlaybackState) -> Vec<ControlCommand> {
        if state.muted || state.volume == 0. {
            let mut commands = vec![ControlCommand::SetMuted(false)];
            if state.volume == 0. {
                commands.push(ControlCommand::SetVolume(self.volume_before_mute));
            }
            commands
        } else {
            self.volume_before_mute = state.volume;
            vec![ControlCommand::SetMuted(true)]
        }
    }

    pub(crate) fn toggle_fullscreen(&mut self, events: &dyn PlayerEvents) {
        self.fullscreen = !self.fullscreen;
        events.on_fullscreen_change(self.fullscreen);
    }

    /// Cancel every pending timer and interaction.
    pub(crate) fn reset(&mut self, scheduler: &dyn Scheduler) {
        self.taps.clear(scheduler);
        self.idle.reset(scheduler);
        self.indicator_timer.cancel(scheduler);
        self.was_playing_before_scrub = false;
        self.resume_after_seek = false;
    }

    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        scheduler: &dyn Scheduler,
        events: &dyn PlayerEvents,
    ) -> ControlCommand {
        match gesture {
            TapGesture::SingleTap => ControlCommand::TogglePlay,
            TapGesture::DoubleTap(direction) => {
                events.on_seek_indicator(direction.into());
                self.indicator_timer.arm(scheduler, self.indicator_ms);
                match direction {
                    SeekDirection::Backward => ControlCommand::SeekBy(-self.seek_amount_seconds),
                    SeekDirection::Forward => ControlCommand::SeekBy(self.seek_amount_seconds),
                }
            }
        }
    }
}

/// Position of the pointer on the progress bar, as a ratio in `[0, 1]`.
pub(crate) fn scrub_ratio(pointer_x: f64, bar_left: f64, bar_width: f64) -> f64 {
    if !(bar_width > 0.) {
        return 0.;
    }
    clamp_f64((pointer_x - bar_left) / bar_width, 0., 1.)
}

/// Snap `rate` to the closest offered playback speed.
pub(crate) fn snap_playback_rate(rate: f64) -> f64 {
    PLAYBACK_RATES
        .iter()
        .copied()
        .min_by(|a, b| (a - rate).abs().total_cmp(&(b - rate).abs()))
        .unwrap_or(1.)
}

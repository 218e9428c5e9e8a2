use crate::{
    bindings::TimerId,
    controls::ControlCommand,
    media_session::{SessionError, SessionEvent, StreamSource},
    stall_recovery::StallAction,
    supervisor::SupervisorDecision,
    Logger,
};

use super::{Dispatcher, LoadState, PlayerConfiguration, StreamErrorKind};

/// Internal logic of the `Dispatcher`, not exposed to the JavaScript-side.
impl Dispatcher {
    /// Bind `source` to the media element, replacing whatever was bound before, and
    /// resume at `resume_percent` once its duration is known.
    pub(super) fn open_source(&mut self, source: StreamSource, resume_percent: f64) {
        self.stall_monitor.reset(self.scheduler.as_ref());
        self.quality.reset();
        self.progress.reset(resume_percent);
        if let Err(err) = self.session.open(source) {
            let decision = match err {
                SessionError::UnsupportedFormat { .. } => {
                    self.supervisor.on_unsupported(err.to_string())
                }
                SessionError::ManifestLoad { .. } => self.supervisor.on_fatal_error(
                    StreamErrorKind::Network,
                    err.to_string(),
                    self.scheduler.as_ref(),
                ),
            };
            self.apply_decision(decision);
        }
    }

    /// Close the session and cancel everything pending.
    pub(super) fn teardown(&mut self) {
        let scheduler = self.scheduler.as_ref();
        self.session.close();
        self.stall_monitor.reset(scheduler);
        self.supervisor.reset(scheduler);
        self.controls.reset(scheduler);
        self.quality.reset();
        self.source = None;
    }

    /// Percentage at which a rebuilt session should resume: the last one measured if any,
    /// the one the current session was opened with otherwise.
    pub(super) fn resume_percent(&self) -> f64 {
        match self.progress.last_percent() {
            Some(percent) if percent > 0 => f64::from(percent),
            _ => self.progress.resume_percent(),
        }
    }

    pub(super) fn set_load_state(&mut self, state: LoadState) {
        if self.load_state != state {
            Logger::lazy_debug(&|| format!("Dispatcher: Load state {state:?}"));
            self.events.on_load_state_change(&state);
            self.load_state = state;
        }
    }

    pub(super) fn apply_configuration(&mut self, config: PlayerConfiguration) {
        Logger::debug("Dispatcher: Applying new configuration");
        self.quality.set_target_height(config.target_height);
        self.stall_monitor.configure(
            config.stall_cooldown_ms,
            config.stall_grace_ms,
            config.stall_nudge_seconds,
        );
        self.progress
            .configure(config.progress_throttle_ms, config.milestones.clone());
        self.controls.configure(
            config.seek_amount_seconds,
            config.tap_window_ms,
            config.seek_indicator_ms,
            config.controls_idle_ms,
        );
        let decision = self.supervisor.configure(
            config.max_network_retries,
            config.retry_backoff_step_ms,
            self.scheduler.as_ref(),
        );
        self.config = config;
        match decision {
            Some(decision) => self.apply_decision(decision),
            None => {
                if let LoadState::Retrying { .. } = self.load_state {
                    let retry = *self.supervisor.retry_state();
                    self.set_load_state(LoadState::Retrying {
                        attempt: retry.attempt,
                        max_attempts: retry.max_attempts,
                    });
                }
            }
        }
    }

    /// Route what the `MediaSession` reported to the components concerned.
    pub(super) fn handle_session_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            self.handle_session_event(event);
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LevelsAvailable(levels) => {
                self.events.on_levels_available(&levels);
                self.quality.on_levels_available(&levels, &mut self.session);
            }
            SessionEvent::LevelLoaded => self.quality.on_level_loaded(&mut self.session),
            SessionEvent::MetadataReady { duration } => {
                self.events.on_metadata_ready(duration);
                self.set_load_state(LoadState::Ready);
                if let Some(position) = self.progress.on_metadata_ready(duration) {
                    if self.session.seek(position).is_none() {
                        self.progress.on_seek_completed();
                    }
                }
            }
            SessionEvent::PlaybackStateChange(state) => {
                self.events.on_playback_state_change(&state);
                self.controls.on_playback_state_change(
                    &state,
                    self.scheduler.as_ref(),
                    self.events.as_ref(),
                );
            }
            SessionEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                let now = self.scheduler.now();
                if let Some(sample) = self.progress.on_time_update(current_time, duration, now) {
                    self.events.on_progress(&sample);
                }
            }
            SessionEvent::Play => self.events.on_play(),
            SessionEvent::PlaybackResumed => {
                self.stall_monitor
                    .on_playback_resumed(self.scheduler.as_ref());
            }
            SessionEvent::SeekCompleted => {
                self.progress.on_seek_completed();
                if let Some(command) = self.controls.on_seek_completed() {
                    self.apply_command(command);
                }
            }
            SessionEvent::Stall => {
                self.stall_monitor.on_stall(self.scheduler.as_ref());
            }
            SessionEvent::Ended => self.events.on_ended(),
            SessionEvent::FatalError { kind, details } => {
                let decision =
                    self.supervisor
                        .on_fatal_error(kind, details, self.scheduler.as_ref());
                self.apply_decision(decision);
            }
            SessionEvent::NonFatalError { kind, details } => {
                Logger::lazy_warn(&|| {
                    format!("Dispatcher: Non-fatal {kind:?} error: {details}")
                });
                if self.session.is_stalled() {
                    self.stall_monitor.on_stall(self.scheduler.as_ref());
                }
            }
        }
    }

    pub(super) fn apply_command(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::TogglePlay => {
                if self.session.playback().is_playing {
                    self.session.pause();
                } else {
                    self.session.play();
                }
            }
            ControlCommand::Play => self.session.play(),
            ControlCommand::Pause => self.session.pause(),
            ControlCommand::SeekTo(position) => {
                self.session.seek(position);
            }
            ControlCommand::SeekBy(delta) => {
                let position = self.session.position();
                self.session.seek(position + delta);
            }
            ControlCommand::SetVolume(volume) => self.session.set_volume(volume),
            ControlCommand::SetMuted(muted) => self.session.set_muted(muted),
        }
    }

    fn apply_decision(&mut self, decision: SupervisorDecision) {
        match decision {
            SupervisorDecision::RebuildScheduled { attempt, .. } => {
                self.session.close();
                self.stall_monitor.reset(self.scheduler.as_ref());
                let max_attempts = self.supervisor.retry_state().max_attempts;
                self.set_load_state(LoadState::Retrying {
                    attempt,
                    max_attempts,
                });
            }
            SupervisorDecision::RecoverMediaError { details } => {
                if !self.session.recover_media_error() {
                    Logger::warn("Dispatcher: No adaptive client to recover the media error");
                    let decision = self.supervisor.on_recovery_unavailable(details);
                    self.apply_decision(decision);
                }
            }
            SupervisorDecision::Fail(failure) => {
                self.session.close();
                self.stall_monitor.reset(self.scheduler.as_ref());
                self.set_load_state(LoadState::Failed {
                    class: failure.class(),
                    message: failure.to_string(),
                });
            }
            SupervisorDecision::Ignored => {}
        }
    }

    pub(super) fn on_tap_window_timer_ended(&mut self, id: TimerId) {
        if let Some(command) = self.controls.on_tap_window_elapsed(
            id,
            self.scheduler.as_ref(),
            self.events.as_ref(),
        ) {
            self.apply_command(command);
        }
    }

    pub(super) fn on_stall_grace_timer_ended(&mut self, id: TimerId) {
        let now = self.scheduler.now();
        let still_stalled = self.session.is_stalled();
        let position = self.session.position();
        let buffered = self.session.buffered();
        let action = self
            .stall_monitor
            .on_grace_elapsed(id, now, still_stalled, position, &buffered);
        match action {
            Some(StallAction::SkipBufferHole { to }) | Some(StallAction::Nudge { to }) => {
                self.session.seek(to);
            }
            Some(StallAction::RestartLoad { from }) => self.session.restart_load(from),
            None => {}
        }
    }

    pub(super) fn on_retry_timer_ended(&mut self, id: TimerId) {
        if !self.supervisor.on_backoff_elapsed(id) {
            return;
        }
        let Some(source) = self.source.clone() else {
            return;
        };
        let resume_percent = self.resume_percent();
        Logger::lazy_info(&|| {
            format!("Dispatcher: Rebuilding session, resuming at {resume_percent}%")
        });
        self.open_source(source, resume_percent);
    }
}

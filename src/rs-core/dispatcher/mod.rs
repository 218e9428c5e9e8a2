use std::rc::Rc;

use crate::{
    adaptive::QualityController,
    controls::ControlSurface,
    media_session::{MediaBackend, MediaSession, StreamSource},
    progress::ProgressReporter,
    stall_recovery::StallRecoveryMonitor,
    supervisor::ErrorSupervisor,
    timers::Scheduler,
    wasm_bindgen,
};

pub use configuration::{ConfigurationError, PlayerConfiguration};
pub use event_listeners::{MediaEventKind, MediaObservation, StreamErrorKind};
pub use player_events::{LoadState, PlayerEvents};

mod api;
mod configuration;
mod core;
mod event_listeners;
mod player_events;


/// The `Dispatcher` is the player interface exported to the JavaScript-side.
///
/// It owns every component of the player and routes the events reported by the host
/// between them:
///   - the `MediaSession` binds the current source to the media element and turns what the
///     host reports into session events,
///   - the `QualityController`, `StallRecoveryMonitor`, `ProgressReporter` and
///     `ErrorSupervisor` react to those session events,
///   - the `ControlSurface` turns user input into commands sent back to the `MediaSession`.
#[wasm_bindgen]
pub struct Dispatcher {
    /// Clock and timers of the host's event loop.
    scheduler: Rc<dyn Scheduler>,

    /// Where everything observable from the outside is reported.
    events: Rc<dyn PlayerEvents>,

    config: PlayerConfiguration,

    /// Source asked through `load`, kept even when the session is closed after a failure so
    /// it can be retried.
    source: Option<StreamSource>,

    /// Resume position given alongside the current source, in percent.
    initial_progress_percent: f64,

    load_state: LoadState,

    session: MediaSession,
    quality: QualityController,
    stall_monitor: StallRecoveryMonitor,
    progress: ProgressReporter,
    controls: ControlSurface,
    supervisor: ErrorSupervisor,
}

impl Dispatcher {
    /// Create a `Dispatcher` relying on the given host for media playback, timers and event
    /// reporting.
    pub fn with_host<H>(host: Rc<H>, config: PlayerConfiguration) -> Self
    where
        H: MediaBackend + Scheduler + PlayerEvents + 'static,
    {
        let backend: Rc<dyn MediaBackend> = host.clone();
        let scheduler: Rc<dyn Scheduler> = host.clone();
        let events: Rc<dyn PlayerEvents> = host;
        Self {
            scheduler,
            events,
            source: None,
            initial_progress_percent: 0.,
            load_state: LoadState::Idle,
            session: MediaSession::new(backend),
            quality: QualityController::new(config.target_height),
            stall_monitor: StallRecoveryMonitor::new(
                config.stall_cooldown_ms,
                config.stall_grace_ms,
                config.stall_nudge_seconds,
            ),
            progress: ProgressReporter::new(config.progress_throttle_ms, config.milestones.clone()),
            controls: ControlSurface::new(
                config.seek_amount_seconds,
                config.tap_window_ms,
                config.seek_indicator_ms,
                config.controls_idle_ms,
            ),
            supervisor: ErrorSupervisor::new(
                config.max_network_retries,
                config.retry_backoff_step_ms,
            ),
            config,
        }
    }

    /// Current user-visible loading state.
    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn configuration(&self) -> &PlayerConfiguration {
        &self.config
    }

    /// Automatic retry bookkeeping of the current source.
    pub fn retry_state(&self) -> crate::supervisor::RetryState {
        *self.supervisor.retry_state()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.teardown();
    }
}

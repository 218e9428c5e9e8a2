use crate::{
    adaptive::RenditionLevel,
    bindings::{ErrorClass, SeekIndicator},
    media_session::PlaybackState,
    progress::ProgressSample,
};

/// User-visible loading state of the player.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    /// No content is loaded.
    Idle,

    /// The content is being loaded for the first time.
    Loading,

    /// The content failed to load and will be loaded again automatically.
    Retrying { attempt: u32, max_attempts: u32 },

    /// The content can be played.
    Ready,

    /// The content failed to load, only a manual action can load it again.
    Failed { class: ErrorClass, message: String },
}

/// Everything the player reports to the outside world: the progress-persistence
/// collaborator, the next-content logic and the user interface.
pub trait PlayerEvents {
    fn on_metadata_ready(&self, duration: f64);
    fn on_levels_available(&self, levels: &[RenditionLevel]);
    fn on_playback_state_change(&self, state: &PlaybackState);

    /// A throttled progress measurement, to persist.
    fn on_progress(&self, sample: &ProgressSample);

    /// Playback started or resumed.
    fn on_play(&self);

    /// Playback reached the end of the content.
    fn on_ended(&self);

    fn on_load_state_change(&self, state: &LoadState);
    fn on_controls_visibility_change(&self, visible: bool);
    fn on_seek_indicator(&self, indicator: SeekIndicator);
    fn on_fullscreen_change(&self, enabled: bool);
}

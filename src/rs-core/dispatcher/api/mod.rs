use std::rc::Rc;

use crate::{
    bindings::{formatters::format_load_state_for_js, JsHost, LoadStateCode},
    controls::snap_playback_rate,
    media_session::StreamSource,
    wasm_bindgen, Logger, LoggerLevel,
};

use super::{Dispatcher, LoadState, PlayerConfiguration};

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl Dispatcher {
    /// Create a new `Dispatcher` playing contents on the media element linked to it on the
    /// JavaScript-side, with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Dispatcher::with_host(Rc::new(JsHost), PlayerConfiguration::default())
    }

    /// Start loading a new content, replacing the current one if any.
    ///
    /// # Arguments
    ///
    /// * `uri` - URI of the content, either an adaptive manifest or a progressive file.
    ///
    /// * `initial_progress_percent` - Position, in percent of the content's duration, at
    ///   which playback should start. `0` to start from the beginning.
    pub fn load(&mut self, uri: String, initial_progress_percent: f64) {
        Logger::lazy_info(&|| format!("Dispatcher: Loading {uri} at {initial_progress_percent}%"));
        self.teardown();
        let source = StreamSource::new(uri);
        self.initial_progress_percent = initial_progress_percent;
        self.source = Some(source.clone());
        self.set_load_state(LoadState::Loading);
        self.open_source(source, initial_progress_percent);
    }

    /// Stop playback and unload the current content.
    pub fn stop(&mut self) {
        Logger::info("Dispatcher: Stopping");
        self.teardown();
        self.set_load_state(LoadState::Idle);
    }

    /// Release everything linked to the media element. To call before the player is
    /// removed from the page.
    ///
    /// The `Dispatcher` can still be used afterwards by calling `load` again.
    pub fn dispose(&mut self) {
        Logger::info("Dispatcher: Disposing");
        self.teardown();
        self.set_load_state(LoadState::Idle);
    }

    pub fn play(&mut self) {
        self.session.play();
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    pub fn toggle_play(&mut self) {
        self.apply_command(crate::controls::ControlCommand::TogglePlay);
    }

    /// Seek to the given position in seconds, clamped to the content's bounds.
    pub fn seek(&mut self, position: f64) {
        self.session.seek(position);
    }

    /// Seek `delta` seconds from the current position, clamped to the content's bounds.
    pub fn seek_relative(&mut self, delta: f64) {
        self.apply_command(crate::controls::ControlCommand::SeekBy(delta));
    }

    /// Set the volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f64) {
        self.session.set_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.session.set_muted(muted);
    }

    /// Mute or unmute. Unmuting a player whose volume is `0` restores the last audible
    /// volume.
    pub fn toggle_mute(&mut self) {
        let commands = self.controls.toggle_mute(self.session.playback());
        for command in commands {
            self.apply_command(command);
        }
    }

    /// Set the playback rate to the closest offered speed.
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.session.set_playback_rate(snap_playback_rate(rate));
    }

    pub fn toggle_fullscreen(&mut self) {
        self.controls.toggle_fullscreen(self.events.as_ref());
    }

    /// Indicate whether a submenu (quality, speed...) is open. Controls are never hidden
    /// while one is.
    pub fn set_submenu_open(&mut self, open: bool) {
        let is_playing = self.session.playback().is_playing;
        self.controls.set_submenu_open(
            open,
            is_playing,
            self.scheduler.as_ref(),
            self.events.as_ref(),
        );
    }

    /// Manually retry loading the current content after a failure, with a fresh retry
    /// budget. Playback resumes where it was last reported.
    pub fn retry(&mut self) {
        let Some(source) = self.source.clone() else {
            Logger::warn("Dispatcher: No content to retry");
            return;
        };
        Logger::info("Dispatcher: Manual retry");
        let resume_percent = self.resume_percent();
        self.supervisor.reset(self.scheduler.as_ref());
        self.set_load_state(LoadState::Loading);
        self.open_source(source, resume_percent);
    }

    /// Reload the current content from scratch, as if `load` was called again with the
    /// same arguments.
    pub fn hard_reload(&mut self) {
        let Some(source) = self.source.clone() else {
            Logger::warn("Dispatcher: No content to reload");
            return;
        };
        let initial_progress_percent = self.initial_progress_percent;
        self.load(source.uri().to_owned(), initial_progress_percent);
    }

    /// Update the player's configuration from a JSON object. Absent keys are reset to their
    /// default value.
    ///
    /// Returns `false` and keeps the current configuration if the given one is invalid.
    pub fn update_configuration(&mut self, json: &str) -> bool {
        match PlayerConfiguration::from_json(json) {
            Ok(config) => {
                self.apply_configuration(config);
                true
            }
            Err(err) => {
                Logger::error(&format!("Dispatcher: {err}"));
                false
            }
        }
    }

    /// Set the maximum level of logs emitted, from `0` (none) to `4` (debug).
    pub fn set_log_level(&self, level: u8) {
        Logger::set_logger_level(LoggerLevel::from(level));
    }

    pub fn current_time(&self) -> f64 {
        self.session.position()
    }

    /// Duration of the content in seconds, `0` while unknown.
    pub fn duration(&self) -> f64 {
        self.session.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.session.playback().is_playing
    }

    pub fn volume(&self) -> f64 {
        self.session.playback().volume
    }

    pub fn is_muted(&self) -> bool {
        self.session.playback().muted
    }

    pub fn playback_rate(&self) -> f64 {
        self.session.playback().playback_rate
    }

    pub fn are_controls_visible(&self) -> bool {
        self.controls.controls_visible()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.controls.is_fullscreen()
    }

    /// Current loading state, as last announced through `jsAnnounceLoadState`.
    pub fn load_state_code(&self) -> LoadStateCode {
        format_load_state_for_js(&self.load_state).0
    }

    /// Number of automatic retries performed for the current content.
    pub fn retry_attempt(&self) -> u32 {
        self.supervisor.retry_state().attempt
    }

    /// Height, in pixels, of the rendition level currently used. `None` if unknown.
    pub fn current_level_height(&self) -> Option<u32> {
        self.quality
            .chosen()
            .and_then(|index| self.session.levels().iter().find(|l| l.index == index))
            .map(|level| level.height)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

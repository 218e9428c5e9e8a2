use crate::{
    adaptive::RenditionLevel,
    bindings::{SubscriptionId, TimerId, TimerReason},
    dispatcher::Dispatcher,
    wasm_bindgen, Logger,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Dispatcher {
    /// The JS code should call this method once the adaptive client parsed the manifest
    /// loaded through `jsLoadManifest`.
    ///
    /// # Arguments
    ///
    /// * `subscription_id` - The identifier returned by `jsAddListeners` for the listeners
    ///   which caught that event. Events coming from previous listeners are ignored.
    ///
    /// * `levels` - Rendition levels, as a flat list of `width, height, bitrate` triplets
    ///   in the adaptive client's level order.
    pub fn on_manifest_parsed(&mut self, subscription_id: SubscriptionId, levels: &[u32]) {
        if levels.len() % 3 != 0 {
            Logger::warn("Dispatcher: Ignoring trailing values in the rendition level list");
        }
        let levels = RenditionLevel::list_from_flat(levels);
        let events = self.session.on_manifest_parsed(subscription_id, levels);
        self.handle_session_events(events);
    }

    /// The JS code should call this method each time the adaptive client loaded the
    /// playlist of a level.
    pub fn on_level_loaded(&mut self, subscription_id: SubscriptionId) {
        let events = self.session.on_level_loaded(subscription_id);
        self.handle_session_events(events);
    }

    /// The JS code should call this method on each of the media element's events it
    /// listens to.
    ///
    /// # Arguments
    ///
    /// * `subscription_id` - The identifier returned by `jsAddListeners` for the listeners
    ///   which caught that event.
    ///
    /// * `observation` - The media element's state right after the event.
    pub fn on_media_event(
        &mut self,
        subscription_id: SubscriptionId,
        observation: MediaObservation,
    ) {
        let events = self.session.on_media_event(subscription_id, &observation);
        self.handle_session_events(events);
    }

    /// The JS code should call this method each time the adaptive client or the media
    /// element reported an error.
    ///
    /// # Arguments
    ///
    /// * `subscription_id` - The identifier returned by `jsAddListeners` for the listeners
    ///   which caught that error.
    ///
    /// * `fatal` - If `true`, the adaptive client or the media element cannot continue
    ///   playback by itself.
    ///
    /// * `kind` - Broad category of the error.
    ///
    /// * `details` - Human-readable description of the error, if one is known.
    pub fn on_stream_error(
        &mut self,
        subscription_id: SubscriptionId,
        fatal: bool,
        kind: StreamErrorKind,
        details: Option<String>,
    ) {
        let events = self
            .session
            .on_stream_error(subscription_id, fatal, kind, details);
        self.handle_session_events(events);
    }

    /// The JS code should call this method each time a timer started with the `jsTimer`
    /// function finished.
    ///
    /// # Arguments
    ///
    /// * `id` - The `TimerId` given by `jsTimer` when the timer was
    ///   started. This allows the `Dispatcher` to identify which timer
    ///   actually finished.
    ///
    /// * `reason` - The `TimerReason` given by the Rust code when that timer
    ///   was started.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        match reason {
            TimerReason::TapWindow => self.on_tap_window_timer_ended(id),
            TimerReason::SeekIndicator => {
                self.controls.on_indicator_elapsed(id, self.events.as_ref())
            }
            TimerReason::ControlsIdle => {
                let is_playing = self.session.playback().is_playing;
                self.controls
                    .on_idle_elapsed(id, is_playing, self.events.as_ref());
            }
            TimerReason::StallGrace => self.on_stall_grace_timer_ended(id),
            TimerReason::RetryBackoff => self.on_retry_timer_ended(id),
        }
    }

    /// The JS code should call this method on each tap or click on the video surface.
    ///
    /// # Arguments
    ///
    /// * `x` - Horizontal position of the tap relative to the video surface, in pixels.
    ///
    /// * `container_width` - Width of the video surface, in pixels.
    pub fn on_surface_tap(&mut self, x: f64, container_width: f64) {
        if let Some(command) =
            self.controls
                .on_tap(x, container_width, self.scheduler.as_ref(), self.events.as_ref())
        {
            self.apply_command(command);
        }
    }

    /// The JS code should call this method when the pointer is pressed on the progress bar.
    pub fn on_progress_bar_press(&mut self) {
        let is_playing = self.session.playback().is_playing;
        if let Some(command) = self.controls.on_progress_bar_press(is_playing) {
            self.apply_command(command);
        }
    }

    /// The JS code should call this method when a click or a drag on the progress bar
    /// ended.
    ///
    /// # Arguments
    ///
    /// * `pointer_x` - Horizontal position of the pointer, in pixels.
    ///
    /// * `bar_left` - Horizontal position of the progress bar's left edge, in pixels.
    ///
    /// * `bar_width` - Width of the progress bar, in pixels.
    pub fn on_progress_bar_release(&mut self, pointer_x: f64, bar_left: f64, bar_width: f64) {
        let duration = self.session.duration();
        let is_playing = self.session.playback().is_playing;
        if let Some(command) = self.controls.on_progress_bar_release(
            pointer_x,
            bar_left,
            bar_width,
            duration,
            is_playing,
        ) {
            self.apply_command(command);
        }
    }

    /// The JS code should call this method on pointer movements over the player.
    pub fn on_pointer_activity(&mut self) {
        let is_playing = self.session.playback().is_playing;
        self.controls.on_pointer_activity(
            is_playing,
            self.scheduler.as_ref(),
            self.events.as_ref(),
        );
    }
}

/// Media element events the JS code reports through `on_media_event`.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEventKind {
    LoadedMetadata,
    DurationChange,
    TimeUpdate,
    Play,
    Playing,
    Pause,
    Waiting,
    Stalled,
    Seeking,
    Seeked,
    Ended,
    VolumeChange,
    RateChange,
}

/// Category of an error reported through `on_stream_error`.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// The content or one of its resources could not be fetched.
    Network,

    /// The content could not be decoded.
    Media,

    Other,
}

/// State of the media element as observed right after one of its events.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct MediaObservation {
    reason: MediaEventKind,
    current_time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
    volume: f64,
    muted: bool,
    playback_rate: f64,
}

#[wasm_bindgen]
impl MediaObservation {
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(constructor)]
    pub fn new(
        reason: MediaEventKind,
        current_time: f64,
        duration: f64,
        paused: bool,
        ended: bool,
        volume: f64,
        muted: bool,
        playback_rate: f64,
    ) -> Self {
        Self {
            reason,
            current_time,
            duration,
            paused,
            ended,
            volume,
            muted,
            playback_rate,
        }
    }
}

impl MediaObservation {
    #[inline(always)]
    pub fn reason(&self) -> MediaEventKind {
        self.reason
    }

    #[inline(always)]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// `NaN` while unknown, `Infinity` for live contents.
    #[inline(always)]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline(always)]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[inline(always)]
    pub fn ended(&self) -> bool {
        self.ended
    }

    #[inline(always)]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline(always)]
    pub fn muted(&self) -> bool {
        self.muted
    }

    #[inline(always)]
    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }
}

use crate::wasm_bindgen;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Returns a monotonic timestamp in milliseconds (`performance.now()`).
    pub fn jsNow() -> f64;

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of the
    // `Dispatcher` will be called with both the corresponding `TimerId` and `reason`.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Returns `true` if the current environment is able to run the adaptive streaming
    // client (which generally means that the MediaSource API is available).
    pub fn jsIsAdaptiveClientSupported() -> bool;

    // Returns `true` if the media element can play the content behind `url` by itself.
    pub fn jsCanPlayNatively(url: &str) -> bool;

    // Construct a new adaptive streaming client instance. Only one such instance may exist
    // at a time: `jsDestroyAdaptiveClient` is always called before creating a new one.
    pub fn jsCreateAdaptiveClient();

    // Ask the adaptive streaming client to fetch and parse the manifest at `url`.
    //
    // The result is reported through the `on_manifest_parsed` or `on_stream_error` methods
    // of the `Dispatcher`.
    pub fn jsLoadManifest(url: &str);

    // Bind the adaptive streaming client to the media element and begin preloading.
    pub fn jsAttachAdaptiveClient();

    // Detach the adaptive streaming client from the media element and free it.
    //
    // Does nothing if no client currently exists.
    pub fn jsDestroyAdaptiveClient();

    // Returns the index of the rendition level currently played by the adaptive client,
    // `None` if none has been chosen yet.
    pub fn jsGetCurrentLevel() -> Option<u32>;

    // Force the adaptive client to switch to the rendition level at index `level`.
    pub fn jsSetCurrentLevel(level: u32);

    // Ask the adaptive client to restart segment loading from `position`, in seconds.
    pub fn jsStartLoad(position: f64);

    // Call the adaptive client's built-in recovery procedure for media decoding errors.
    pub fn jsRecoverMediaError();

    // Set the `src` attribute of the media element, for native playback.
    pub fn jsSetNativeSource(url: &str);

    // Remove the `src` attribute of the media element and reload it to free its resources.
    pub fn jsClearSource();

    pub fn jsPlay();
    pub fn jsPause();

    // Set the `currentTime` attribute of the media element.
    pub fn jsSeek(position: f64);

    pub fn jsSetVolume(volume: f64);
    pub fn jsSetMuted(muted: bool);
    pub fn jsSetPlaybackRate(playback_rate: f64);

    pub fn jsGetCurrentTime() -> f64;
    pub fn jsGetDuration() -> f64;

    // Get the content of what has been buffered by the media element, in terms of
    // contiguous time ranges, in seconds.
    // The returned vector has an even length as it is organized by couples of f64: the
    // first of which is the start of the contiguous range in seconds and the second the end.
    pub fn jsGetBuffered() -> Vec<f64>;

    // Register all media element and adaptive client event listeners.
    //
    // Every event then sent to the `Dispatcher` carries back the returned
    // `SubscriptionId`.
    pub fn jsAddListeners() -> SubscriptionId;

    // Remove all event listeners registered under the given `SubscriptionId`.
    // After this call, no event will ever be sent for it again.
    pub fn jsRemoveListeners(id: SubscriptionId);

    pub fn jsAnnounceProgress(percent: u32, current_time: f64, duration: f64, timestamp: f64);
    pub fn jsAnnouncePlay();
    pub fn jsAnnounceEnded();
    pub fn jsAnnounceMetadata(duration: f64);

    // Announce the rendition levels of the current content, as a flat list of
    // `[width, height, bitrate, ...]` triplets, ordered by level index.
    pub fn jsAnnounceLevels(levels: Vec<u32>);

    pub fn jsAnnouncePlaybackState(
        is_playing: bool,
        current_time: f64,
        duration: f64,
        volume: f64,
        muted: bool,
        playback_rate: f64,
    );

    pub fn jsAnnounceLoadState(state: LoadStateCode, attempt: u32, max_attempts: u32);
    pub fn jsAnnounceLoadFailure(class: ErrorClass, message: &str);

    pub fn jsSetControlsVisibility(visible: bool);
    pub fn jsSetSeekIndicator(indicator: SeekIndicator);
    pub fn jsSetFullscreen(enabled: bool);
}

/// "Reason" associated to a timer started by the player.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// Window during which a second tap turns a single tap into a double tap.
    TapWindow = 0,

    /// The transient double-tap seek indicator should now be hidden.
    SeekIndicator = 1,

    /// No pointer activity happened for a while, controls may be hidden.
    ControlsIdle = 2,

    /// Grace delay let to a stall before trying to recover from it.
    StallGrace = 3,

    /// Backoff delay awaited before rebuilding a failed media session.
    RetryBackoff = 4,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify the user-visible loading state.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStateCode {
    Idle = 0,
    Loading = 1,
    Retrying = 2,
    Ready = 3,
    Failed = 4,
}

/// Error categories surfaced to the user interface.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Network = 0,
    Media = 1,
    Unsupported = 2,
    Unknown = 3,
}

/// State of the transient indicator displayed after a double tap.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekIndicator {
    Hidden = 0,
    Backward = 1,
    Forward = 2,
}

/// Identify a pending timer.
pub type TimerId = f64;

/// Identify a set of event listeners registered on the JavaScript-side.
pub type SubscriptionId = u32;

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ErrorClass::Network => "network",
                ErrorClass::Media => "media",
                ErrorClass::Unsupported => "unsupported",
                ErrorClass::Unknown => "unknown",
            }
        )
    }
}

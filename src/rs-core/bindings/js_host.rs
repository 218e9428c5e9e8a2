use super::{
    formatters::{format_levels_for_js, format_load_state_for_js},
    *,
};
use crate::{
    adaptive::RenditionLevel,
    dispatcher::{LoadState, PlayerEvents},
    media_session::{MediaBackend, PlaybackState},
    progress::ProgressSample,
    timers::Scheduler,
    utils::time_ranges::TimeRanges,
};

/// The JavaScript-side, as seen by the `Dispatcher`: media element, adaptive client,
/// timers and user interface are all reached through the `js*` functions.
pub struct JsHost;

impl MediaBackend for JsHost {
    fn supports_adaptive_client(&self) -> bool {
        jsIsAdaptiveClientSupported()
    }

    fn supports_native_playback(&self, uri: &str) -> bool {
        jsCanPlayNatively(uri)
    }

    fn create_client(&self) {
        jsCreateAdaptiveClient();
    }

    fn load_manifest(&self, uri: &str) {
        jsLoadManifest(uri);
    }

    fn attach_client(&self) {
        jsAttachAdaptiveClient();
    }

    fn destroy_client(&self) {
        jsDestroyAdaptiveClient();
    }

    fn current_level(&self) -> Option<u32> {
        jsGetCurrentLevel()
    }

    fn set_current_level(&self, index: u32) {
        jsSetCurrentLevel(index);
    }

    fn start_load(&self, position: f64) {
        jsStartLoad(position);
    }

    fn recover_media_error(&self) {
        jsRecoverMediaError();
    }

    fn set_native_source(&self, uri: &str) {
        jsSetNativeSource(uri);
    }

    fn clear_source(&self) {
        jsClearSource();
    }

    fn play(&self) {
        jsPlay();
    }

    fn pause(&self) {
        jsPause();
    }

    fn seek(&self, position: f64) {
        jsSeek(position);
    }

    fn set_volume(&self, volume: f64) {
        jsSetVolume(volume);
    }

    fn set_muted(&self, muted: bool) {
        jsSetMuted(muted);
    }

    fn set_playback_rate(&self, rate: f64) {
        jsSetPlaybackRate(rate);
    }

    fn current_time(&self) -> f64 {
        jsGetCurrentTime()
    }

    fn duration(&self) -> f64 {
        jsGetDuration()
    }

    fn buffered(&self) -> TimeRanges {
        TimeRanges::from_flat(&jsGetBuffered())
    }

    fn add_listeners(&self) -> SubscriptionId {
        jsAddListeners()
    }

    fn remove_listeners(&self, id: SubscriptionId) {
        jsRemoveListeners(id);
    }
}

impl Scheduler for JsHost {
    fn now(&self) -> f64 {
        jsNow()
    }

    fn start_timer(&self, duration_ms: f64, reason: TimerReason) -> TimerId {
        jsTimer(duration_ms, reason)
    }

    fn clear_timer(&self, id: TimerId) {
        jsClearTimer(id);
    }
}

impl PlayerEvents for JsHost {
    fn on_metadata_ready(&self, duration: f64) {
        jsAnnounceMetadata(duration);
    }

    fn on_levels_available(&self, levels: &[RenditionLevel]) {
        jsAnnounceLevels(format_levels_for_js(levels));
    }

    fn on_playback_state_change(&self, state: &PlaybackState) {
        jsAnnouncePlaybackState(
            state.is_playing,
            state.current_time_seconds,
            state.duration_seconds,
            state.volume,
            state.muted,
            state.playback_rate,
        );
    }

    fn on_progress(&self, sample: &ProgressSample) {
        jsAnnounceProgress(
            sample.percent,
            sample.current_time_seconds,
            sample.duration_seconds,
            sample.timestamp,
        );
    }

    fn on_play(&self) {
        jsAnnouncePlay();
    }

    fn on_ended(&self) {
        jsAnnounceEnded();
    }

    fn on_load_state_change(&self, state: &LoadState) {
        let (code, attempt, max_attempts, failure) = format_load_state_for_js(state);
        jsAnnounceLoadState(code, attempt, max_attempts);
        if let Some((class, message)) = failure {
            jsAnnounceLoadFailure(class, message);
        }
    }

    fn on_controls_visibility_change(&self, visible: bool) {
        jsSetControlsVisibility(visible);
    }

    fn on_seek_indicator(&self, indicator: SeekIndicator) {
        jsSetSeekIndicator(indicator);
    }

    fn on_fullscreen_change(&self, enabled: bool) {
        jsSetFullscreen(enabled);
    }
}

use std::rc::Rc;

use thiserror::Error;

use self::subscription::ScopedSubscription;
use crate::{
    adaptive::{LevelControl, RenditionLevel},
    bindings::SubscriptionId,
    dispatcher::{MediaEventKind, MediaObservation, StreamErrorKind},
    utils::{clamp_f64, time_ranges::TimeRanges},
    Logger,
};

pub use backend::MediaBackend;

mod backend;
mod subscription;

const MIN_PLAYBACK_RATE: f64 = 0.0625;
const MAX_PLAYBACK_RATE: f64 = 16.;

/// Location of the manifest of the content to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSource {
    uri: String,
}

impl StreamSource {
    pub fn new(uri: String) -> Self {
        Self { uri }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Playback-related attributes of the media element, as last observed.
///
/// Only the `MediaSession` writes to it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time_seconds: 0.,
            duration_seconds: 0.,
            volume: 1.,
            muted: false,
            playback_rate: 1.,
        }
    }
}

/// Events produced by the `MediaSession` from what the host reports.
///
/// This is the only channel through which the other components learn about playback.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SessionEvent {
    LevelsAvailable(Vec<RenditionLevel>),
    LevelLoaded,
    MetadataReady { duration: f64 },
    PlaybackStateChange(PlaybackState),
    TimeUpdate { current_time: f64, duration: f64 },
    Play,
    PlaybackResumed,
    SeekCompleted,
    Stall,
    Ended,
    FatalError { kind: StreamErrorKind, details: String },
    NonFatalError { kind: StreamErrorKind, details: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    /// No source is bound to the media element.
    Closed,

    /// A source has been bound but its manifest or metadata are still awaited.
    Opening,

    /// Metadata are known, the content can be played.
    Ready,
}

/// Binds one `StreamSource` at a time to the playable surface.
///
/// The `MediaSession` owns the adaptive client's lifecycle, the event listeners
/// registration and the `PlaybackState`.
pub(crate) struct MediaSession {
    backend: Rc<dyn MediaBackend>,

    /// Listeners of the current binding. Dropping it unregisters them.
    subscription: Option<ScopedSubscription>,

    state: SessionState,

    /// `true` if the current source is played through the adaptive client, `false` if it is
    /// played natively by the media element.
    uses_adaptive_client: bool,

    playback: PlaybackState,

    /// Rendition levels of the last parsed manifest.
    levels: Vec<RenditionLevel>,

    /// Set while the media element reports that it is waiting for data.
    is_stalled: bool,
}

impl MediaSession {
    pub(crate) fn new(backend: Rc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            subscription: None,
            state: SessionState::Closed,
            uses_adaptive_client: false,
            playback: PlaybackState::default(),
            levels: vec![],
            is_stalled: false,
        }
    }

    /// Tear down any previous binding then bind `source` to the media element.
    ///
    /// Loading is asynchronous: the returned `SubscriptionId` is the one future events for
    /// that source will carry.
    pub(crate) fn open(&mut self, source: StreamSource) -> Result<SubscriptionId, SessionError> {
        self.close();
        Logger::lazy_info(&|| format!("Session: Opening {}", source.uri()));

        let uses_adaptive_client = if self.backend.supports_adaptive_client() {
            true
        } else if self.backend.supports_native_playback(source.uri()) {
            false
        } else {
            return Err(SessionError::UnsupportedFormat {
                uri: source.uri().to_owned(),
            });
        };

        let subscription = ScopedSubscription::register(self.backend.clone());
        let id = subscription.id();
        if uses_adaptive_client {
            self.backend.create_client();
            self.backend.load_manifest(source.uri());
            self.backend.attach_client();
        } else {
            Logger::info("Session: No adaptive client available, relying on native playback");
            self.backend.set_native_source(source.uri());
        }

        self.subscription = Some(subscription);
        self.uses_adaptive_client = uses_adaptive_client;
        self.state = SessionState::Opening;
        Ok(id)
    }

    /// Unbind the current source if one: pause, remove listeners, destroy the adaptive client
    /// and clear the media element's source.
    ///
    /// Can be called at any time, any number of times.
    pub(crate) fn close(&mut self) {
        if self.state == SessionState::Closed && self.subscription.is_none() {
            return;
        }
        Logger::info("Session: Closing current session");
        self.backend.pause();
        self.subscription = None;
        if self.uses_adaptive_client {
            self.backend.destroy_client();
        }
        self.backend.clear_source();

        self.state = SessionState::Closed;
        self.uses_adaptive_client = false;
        self.levels.clear();
        self.is_stalled = false;
        self.playback = PlaybackState {
            volume: self.playback.volume,
            muted: self.playback.muted,
            playback_rate: self.playback.playback_rate,
            ..PlaybackState::default()
        };
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.state != SessionState::Closed
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub(crate) fn is_stalled(&self) -> bool {
        self.is_stalled
    }

    pub(crate) fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub(crate) fn levels(&self) -> &[RenditionLevel] {
        &self.levels
    }

    /// Ranges currently buffered, queried from the media element.
    pub(crate) fn buffered(&self) -> TimeRanges {
        if self.is_attached() {
            self.backend.buffered()
        } else {
            TimeRanges::new()
        }
    }

    /// Last known playback position, in seconds.
    pub(crate) fn position(&self) -> f64 {
        if self.is_attached() {
            self.backend.current_time()
        } else {
            0.
        }
    }

    /// Duration of the content in seconds, `0` while unknown. Asks the media element directly
    /// when no duration has been observed yet.
    pub(crate) fn duration(&self) -> f64 {
        if self.playback.duration_seconds > 0. || !self.is_attached() {
            self.playback.duration_seconds
        } else {
            sanitize_duration(self.backend.duration())
        }
    }

    pub(crate) fn play(&mut self) {
        if self.is_attached() {
            self.backend.play();
        }
    }

    pub(crate) fn pause(&mut self) {
        if self.is_attached() {
            self.backend.pause();
        }
    }

    /// Seek to `seconds`, clamped into `[0, duration]` (only the lower bound applies while
    /// the duration is still unknown).
    ///
    /// Returns the position actually seeked to, `None` if not attached.
    pub(crate) fn seek(&mut self, seconds: f64) -> Option<f64> {
        if !self.is_attached() {
            return None;
        }
        let duration = self.playback.duration_seconds;
        let max = if duration > 0. { duration } else { f64::MAX };
        let position = clamp_f64(seconds, 0., max);
        Logger::lazy_debug(&|| format!("Session: Seeking to {position}"));
        self.backend.seek(position);
        Some(position)
    }

    pub(crate) fn set_volume(&mut self, volume: f64) {
        if self.is_attached() {
            let volume = clamp_f64(volume, 0., 1.);
            self.playback.volume = volume;
            self.backend.set_volume(volume);
        }
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        if self.is_attached() {
            self.playback.muted = muted;
            self.backend.set_muted(muted);
        }
    }

    pub(crate) fn set_playback_rate(&mut self, rate: f64) {
        if self.is_attached() {
            let rate = clamp_f64(rate, MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
            self.playback.playback_rate = rate;
            self.backend.set_playback_rate(rate);
        }
    }

    /// Ask the adaptive client to reload segments from `position`.
    pub(crate) fn restart_load(&mut self, position: f64) {
        if self.is_attached() && self.uses_adaptive_client {
            Logger::lazy_info(&|| format!("Session: Restarting segment loading at {position}"));
            self.backend.start_load(position);
        }
    }

    /// Ask the adaptive client to recover from a media decoding error.
    ///
    /// Returns `false` if no adaptive client is running.
    pub(crate) fn recover_media_error(&mut self) -> bool {
        if self.is_attached() && self.uses_adaptive_client {
            self.backend.recover_media_error();
            true
        } else {
            false
        }
    }

    /// Method to call once the adaptive client parsed the manifest.
    pub(crate) fn on_manifest_parsed(
        &mut self,
        id: SubscriptionId,
        levels: Vec<RenditionLevel>,
    ) -> Vec<SessionEvent> {
        if !self.is_current(id) {
            return vec![];
        }
        Logger::lazy_info(&|| format!("Session: Manifest parsed with {} level(s)", levels.len()));
        self.levels = levels.clone();
        vec![SessionEvent::LevelsAvailable(levels)]
    }

    /// Method to call each time the adaptive client loaded a level's playlist.
    pub(crate) fn on_level_loaded(&mut self, id: SubscriptionId) -> Vec<SessionEvent> {
        if !self.is_current(id) {
            return vec![];
        }
        vec![SessionEvent::LevelLoaded]
    }

    /// Method to call on each media element event.
    pub(crate) fn on_media_event(
        &mut self,
        id: SubscriptionId,
        observation: &MediaObservation,
    ) -> Vec<SessionEvent> {
        if !self.is_current(id) {
            return vec![];
        }
        let duration = sanitize_duration(observation.duration());
        self.playback.current_time_seconds = observation.current_time();
        self.playback.duration_seconds = duration;
        self.playback.volume = observation.volume();
        self.playback.muted = observation.muted();
        self.playback.playback_rate = observation.playback_rate();
        self.playback.is_playing = !observation.paused() && !observation.ended();

        match observation.reason() {
            MediaEventKind::LoadedMetadata | MediaEventKind::DurationChange => {
                if duration > 0. {
                    self.state = SessionState::Ready;
                    vec![
                        SessionEvent::MetadataReady { duration },
                        self.state_change(),
                    ]
                } else {
                    vec![self.state_change()]
                }
            }
            MediaEventKind::TimeUpdate => vec![SessionEvent::TimeUpdate {
                current_time: observation.current_time(),
                duration,
            }],
            MediaEventKind::Play => vec![SessionEvent::Play, self.state_change()],
            MediaEventKind::Playing => {
                self.is_stalled = false;
                vec![SessionEvent::PlaybackResumed, self.state_change()]
            }
            MediaEventKind::Waiting | MediaEventKind::Stalled => {
                self.is_stalled = true;
                vec![SessionEvent::Stall]
            }
            MediaEventKind::Seeked => vec![SessionEvent::SeekCompleted, self.state_change()],
            MediaEventKind::Ended => {
                self.playback.is_playing = false;
                vec![SessionEvent::Ended, self.state_change()]
            }
            MediaEventKind::Pause
            | MediaEventKind::Seeking
            | MediaEventKind::VolumeChange
            | MediaEventKind::RateChange => vec![self.state_change()],
        }
    }

    /// Method to call when the adaptive client or the media element reported an error.
    pub(crate) fn on_stream_error(
        &mut self,
        id: SubscriptionId,
        fatal: bool,
        kind: StreamErrorKind,
        details: Option<String>,
    ) -> Vec<SessionEvent> {
        if !self.is_current(id) {
            return vec![];
        }
        let details = details.unwrap_or_else(|| "Unknown error".to_owned());
        if !fatal {
            return vec![SessionEvent::NonFatalError { kind, details }];
        }
        let details = if kind == StreamErrorKind::Network
            && self.uses_adaptive_client
            && self.state == SessionState::Opening
            && self.levels.is_empty()
        {
            SessionError::ManifestLoad { message: details }.to_string()
        } else {
            details
        };
        Logger::lazy_warn(&|| format!("Session: Fatal {kind:?} error: {details}"));
        vec![SessionEvent::FatalError { kind, details }]
    }

    fn is_current(&self, id: SubscriptionId) -> bool {
        let is_current = self.subscription.as_ref().map(|s| s.id()) == Some(id);
        if !is_current {
            Logger::lazy_debug(&|| format!("Session: Ignoring event from stale listeners ({id})"));
        }
        is_current
    }

    fn state_change(&self) -> SessionEvent {
        SessionEvent::PlaybackStateChange(self.playback.clone())
    }
}

impl LevelControl for MediaSession {
    fn current_level(&self) -> Option<u32> {
        if self.is_attached() && self.uses_adaptive_client {
            self.backend.current_level()
        } else {
            None
        }
    }

    fn set_current_level(&mut self, index: u32) {
        if self.is_attached() && self.uses_adaptive_client {
            self.backend.set_current_level(index);
        }
    }
}

/// Duration as reported by the media element is `NaN` before metadata and `Infinity` for
/// live contents. Both are considered as unknown here.
fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0. {
        duration
    } else {
        0.
    }
}

/// Error that may be returned when opening a `StreamSource`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Neither the adaptive client nor the media element can play `{uri}`")]
    UnsupportedFormat { uri: String },
    #[error("Could not load the manifest: {message}")]
    ManifestLoad { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{observation, MockHost};

    fn session(host: &Rc<MockHost>) -> MediaSession {
        MediaSession::new(host.clone())
    }

    fn source(uri: &str) -> StreamSource {
        StreamSource::new(uri.to_owned())
    }

    #[test]
    fn test_open_binds_adaptive_client() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let id = session.open(source("https://cdn/a.m3u8")).unwrap();
        assert_eq!(host.active_listeners(), vec![id]);
        assert_eq!(host.calls("create_client"), 1);
        assert_eq!(host.calls("load_manifest"), 1);
        assert_eq!(host.calls("attach_client"), 1);
        assert_eq!(host.live_clients(), 1);
        assert!(session.is_attached());
        assert!(!session.is_ready());
    }

    #[test]
    fn test_open_falls_back_to_native_playback() {
        let host = Rc::new(MockHost::new());
        host.set_adaptive_supported(false);
        let mut session = session(&host);
        session.open(source("https://cdn/a.m3u8")).unwrap();
        assert_eq!(host.calls("create_client"), 0);
        assert_eq!(host.calls("set_native_source"), 1);
    }

    #[test]
    fn test_open_unsupported_format() {
        let host = Rc::new(MockHost::new());
        host.set_adaptive_supported(false);
        host.set_native_supported(false);
        let mut session = session(&host);
        let err = session.open(source("https://cdn/a.m3u8")).unwrap_err();
        assert_eq!(
            err,
            SessionError::UnsupportedFormat {
                uri: "https://cdn/a.m3u8".to_owned()
            }
        );
        assert!(!session.is_attached());
        assert!(host.active_listeners().is_empty());
    }

    #[test]
    fn test_close_twice_is_harmless() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        session.open(source("https://cdn/a.m3u8")).unwrap();
        session.close();
        session.close();
        assert_eq!(host.calls("add_listeners"), 1);
        assert_eq!(host.calls("remove_listeners"), 1);
        assert_eq!(host.calls("destroy_client"), 1);
        assert_eq!(host.calls("clear_source"), 1);
        assert!(host.active_listeners().is_empty());
        assert_eq!(host.live_clients(), 0);
    }

    #[test]
    fn test_close_before_open_does_nothing() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        session.close();
        assert_eq!(host.calls("pause"), 0);
        assert_eq!(host.calls("clear_source"), 0);
    }

    #[test]
    fn test_reopen_keeps_a_single_client() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let first = session.open(source("https://cdn/a.m3u8")).unwrap();
        let second = session.open(source("https://cdn/b.m3u8")).unwrap();
        assert_ne!(first, second);
        assert_eq!(host.live_clients(), 1);
        assert_eq!(host.active_listeners(), vec![second]);

        let obs = observation(MediaEventKind::LoadedMetadata, 0., 100.);
        assert!(session.on_media_event(first, &obs).is_empty());
        assert!(session.on_manifest_parsed(first, vec![]).is_empty());
        assert!(session
            .on_stream_error(first, true, StreamErrorKind::Network, None)
            .is_empty());
        assert!(!session.on_media_event(second, &obs).is_empty());
    }

    #[test]
    fn test_commands_ignored_when_not_attached() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        session.play();
        session.pause();
        assert_eq!(session.seek(10.), None);
        session.set_volume(0.5);
        session.set_muted(true);
        session.set_playback_rate(2.);
        session.restart_load(3.);
        assert!(!session.recover_media_error());
        assert_eq!(host.total_calls(), 0);
    }

    #[test]
    fn test_commands_clamp_inputs() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let id = session.open(source("https://cdn/a.m3u8")).unwrap();
        session.on_media_event(id, &observation(MediaEventKind::LoadedMetadata, 0., 100.));

        assert_eq!(session.seek(-4.), Some(0.));
        assert_eq!(session.seek(140.), Some(100.));
        assert_eq!(session.seek(f64::NAN), Some(0.));
        session.set_volume(1.7);
        assert_eq!(session.playback().volume, 1.);
        session.set_volume(-1.);
        assert_eq!(session.playback().volume, 0.);
        assert_eq!(host.seeks(), vec![0., 100., 0.]);
    }

    #[test]
    fn test_metadata_requires_known_duration() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let id = session.open(source("https://cdn/a.m3u8")).unwrap();
        let events =
            session.on_media_event(id, &observation(MediaEventKind::LoadedMetadata, 0., f64::NAN));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::MetadataReady { .. })));
        assert!(!session.is_ready());

        let events =
            session.on_media_event(id, &observation(MediaEventKind::LoadedMetadata, 0., 60.));
        assert_eq!(events[0], SessionEvent::MetadataReady { duration: 60. });
        assert!(session.is_ready());
    }

    #[test]
    fn test_duration_read_from_media_element() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        host.set_duration(90.);
        assert_eq!(session.duration(), 0.);

        session.open(source("https://cdn/a.m3u8")).unwrap();
        assert_eq!(session.duration(), 90.);
        host.set_duration(f64::INFINITY);
        assert_eq!(session.duration(), 0.);
    }

    #[test]
    fn test_manifest_failure_while_opening() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let id = session.open(source("https://cdn/a.m3u8")).unwrap();
        let events = session.on_stream_error(
            id,
            true,
            StreamErrorKind::Network,
            Some("404".to_owned()),
        );
        assert_eq!(
            events,
            vec![SessionEvent::FatalError {
                kind: StreamErrorKind::Network,
                details: "Could not load the manifest: 404".to_owned()
            }]
        );
    }

    #[test]
    fn test_stall_tracking() {
        let host = Rc::new(MockHost::new());
        let mut session = session(&host);
        let id = session.open(source("https://cdn/a.m3u8")).unwrap();
        assert_eq!(
            session.on_media_event(id, &observation(MediaEventKind::Waiting, 3., 60.)),
            vec![SessionEvent::Stall]
        );
        assert!(session.is_stalled());
        session.on_media_event(id, &observation(MediaEventKind::Playing, 3., 60.));
        assert!(!session.is_stalled());
    }
}

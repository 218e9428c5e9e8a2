use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use crate::{
    adaptive::RenditionLevel,
    bindings::{SeekIndicator, SubscriptionId, TimerId, TimerReason},
    dispatcher::{LoadState, MediaEventKind, MediaObservation, PlayerEvents},
    media_session::{MediaBackend, PlaybackState},
    progress::ProgressSample,
    timers::Scheduler,
    utils::time_ranges::TimeRanges,
};

/// Something reported through `PlayerEvents`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Output {
    MetadataReady(f64),
    LevelsAvailable(Vec<RenditionLevel>),
    PlaybackState(PlaybackState),
    Progress(ProgressSample),
    Play,
    Ended,
    LoadState(LoadState),
    ControlsVisibility(bool),
    SeekIndicator(SeekIndicator),
    Fullscreen(bool),
}

struct PendingTimer {
    id: TimerId,
    reason: TimerReason,
    deadline: f64,
}

/// In-memory host recording every call made to it, with a manually-advanced clock.
pub(crate) struct MockHost {
    adaptive_supported: Cell<bool>,
    native_supported: Cell<bool>,

    calls: RefCell<HashMap<&'static str, usize>>,
    live_clients: Cell<usize>,
    next_subscription_id: Cell<SubscriptionId>,
    active_listeners: RefCell<Vec<SubscriptionId>>,
    seeks: RefCell<Vec<f64>>,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    buffered: RefCell<Vec<f64>>,
    current_level: Cell<Option<u32>>,

    now: Cell<f64>,
    next_timer_id: Cell<TimerId>,
    pending_timers: RefCell<Vec<PendingTimer>>,
    started_timers: RefCell<Vec<(TimerId, TimerReason)>>,
    cleared_timers: RefCell<Vec<TimerId>>,

    outputs: RefCell<Vec<Output>>,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        Self {
            adaptive_supported: Cell::new(true),
            native_supported: Cell::new(true),
            calls: RefCell::new(HashMap::new()),
            live_clients: Cell::new(0),
            next_subscription_id: Cell::new(1),
            active_listeners: RefCell::new(vec![]),
            seeks: RefCell::new(vec![]),
            current_time: Cell::new(0.),
            duration: Cell::new(f64::NAN),
            buffered: RefCell::new(vec![]),
            current_level: Cell::new(None),
            now: Cell::new(10_000.),
            next_timer_id: Cell::new(1.),
            pending_timers: RefCell::new(vec![]),
            started_timers: RefCell::new(vec![]),
            cleared_timers: RefCell::new(vec![]),
            outputs: RefCell::new(vec![]),
        }
    }

    pub(crate) fn set_adaptive_supported(&self, supported: bool) {
        self.adaptive_supported.set(supported);
    }

    pub(crate) fn set_native_supported(&self, supported: bool) {
        self.native_supported.set(supported);
    }

    pub(crate) fn set_current_time(&self, current_time: f64) {
        self.current_time.set(current_time);
    }

    pub(crate) fn set_duration(&self, duration: f64) {
        self.duration.set(duration);
    }

    /// Set buffered ranges as a flat `[start, end, ...]` list.
    pub(crate) fn set_buffered(&self, flat: &[f64]) {
        *self.buffered.borrow_mut() = flat.to_vec();
    }

    /// Number of calls to the `MediaBackend` method called `name`.
    pub(crate) fn calls(&self, name: &str) -> usize {
        self.calls.borrow().get(name).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    pub(crate) fn live_clients(&self) -> usize {
        self.live_clients.get()
    }

    pub(crate) fn active_listeners(&self) -> Vec<SubscriptionId> {
        self.active_listeners.borrow().clone()
    }

    pub(crate) fn seeks(&self) -> Vec<f64> {
        self.seeks.borrow().clone()
    }

    pub(crate) fn last_timer_id(&self) -> Option<TimerId> {
        self.started_timers.borrow().last().map(|(id, _)| *id)
    }

    pub(crate) fn cleared_timers(&self) -> Vec<TimerId> {
        self.cleared_timers.borrow().clone()
    }

    pub(crate) fn pending_timer_count(&self) -> usize {
        self.pending_timers.borrow().len()
    }

    /// Number of timers ever started for `reason`.
    pub(crate) fn timers_started(&self, reason: TimerReason) -> usize {
        self.started_timers
            .borrow()
            .iter()
            .filter(|(_, r)| *r == reason)
            .count()
    }

    pub(crate) fn set_now(&self, now: f64) {
        self.now.set(now);
    }

    /// Move the clock forward by `ms` and return the timers which expired meanwhile, in
    /// expiration order.
    pub(crate) fn advance(&self, ms: f64) -> Vec<(TimerId, TimerReason)> {
        let now = self.now.get() + ms;
        self.now.set(now);
        let mut pending = self.pending_timers.borrow_mut();
        let (mut expired, remaining): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|t| t.deadline <= now);
        *pending = remaining;
        expired.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        expired.into_iter().map(|t| (t.id, t.reason)).collect()
    }

    pub(crate) fn outputs(&self) -> Vec<Output> {
        self.outputs.borrow().clone()
    }

    fn record(&self, name: &'static str) {
        *self.calls.borrow_mut().entry(name).or_insert(0) += 1;
    }

    fn output(&self, output: Output) {
        self.outputs.borrow_mut().push(output);
    }
}

impl MediaBackend for MockHost {
    fn supports_adaptive_client(&self) -> bool {
        self.record("supports_adaptive_client");
        self.adaptive_supported.get()
    }

    fn supports_native_playback(&self, _uri: &str) -> bool {
        self.record("supports_native_playback");
        self.native_supported.get()
    }

    fn create_client(&self) {
        self.record("create_client");
        self.live_clients.set(self.live_clients.get() + 1);
    }

    fn load_manifest(&self, _uri: &str) {
        self.record("load_manifest");
    }

    fn attach_client(&self) {
        self.record("attach_client");
    }

    fn destroy_client(&self) {
        self.record("destroy_client");
        self.live_clients.set(self.live_clients.get().saturating_sub(1));
        self.current_level.set(None);
    }

    fn current_level(&self) -> Option<u32> {
        self.current_level.get()
    }

    fn set_current_level(&self, index: u32) {
        self.record("set_current_level");
        self.current_level.set(Some(index));
    }

    fn start_load(&self, _position: f64) {
        self.record("start_load");
    }

    fn recover_media_error(&self) {
        self.record("recover_media_error");
    }

    fn set_native_source(&self, _uri: &str) {
        self.record("set_native_source");
    }

    fn clear_source(&self) {
        self.record("clear_source");
        self.current_time.set(0.);
    }

    fn play(&self) {
        self.record("play");
    }

    fn pause(&self) {
        self.record("pause");
    }

    fn seek(&self, position: f64) {
        self.record("seek");
        self.seeks.borrow_mut().push(position);
        self.current_time.set(position);
    }

    fn set_volume(&self, _volume: f64) {
        self.record("set_volume");
    }

    fn set_muted(&self, _muted: bool) {
        self.record("set_muted");
    }

    fn set_playback_rate(&self, _rate: f64) {
        self.record("set_playback_rate");
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn buffered(&self) -> TimeRanges {
        TimeRanges::from_flat(&self.buffered.borrow())
    }

    fn add_listeners(&self) -> SubscriptionId {
        self.record("add_listeners");
        let id = self.next_subscription_id.get();
        self.next_subscription_id.set(id + 1);
        self.active_listeners.borrow_mut().push(id);
        id
    }

    fn remove_listeners(&self, id: SubscriptionId) {
        self.record("remove_listeners");
        self.active_listeners.borrow_mut().retain(|l| *l != id);
    }
}

impl Scheduler for MockHost {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn start_timer(&self, duration_ms: f64, reason: TimerReason) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1.);
        self.pending_timers.borrow_mut().push(PendingTimer {
            id,
            reason,
            deadline: self.now.get() + duration_ms,
        });
        self.started_timers.borrow_mut().push((id, reason));
        id
    }

    fn clear_timer(&self, id: TimerId) {
        self.pending_timers.borrow_mut().retain(|t| t.id != id);
        self.cleared_timers.borrow_mut().push(id);
    }
}

impl PlayerEvents for MockHost {
    fn on_metadata_ready(&self, duration: f64) {
        self.output(Output::MetadataReady(duration));
    }

    fn on_levels_available(&self, levels: &[RenditionLevel]) {
        self.output(Output::LevelsAvailable(levels.to_vec()));
    }

    fn on_playback_state_change(&self, state: &PlaybackState) {
        self.output(Output::PlaybackState(state.clone()));
    }

    fn on_progress(&self, sample: &ProgressSample) {
        self.output(Output::Progress(*sample));
    }

    fn on_play(&self) {
        self.output(Output::Play);
    }

    fn on_ended(&self) {
        self.output(Output::Ended);
    }

    fn on_load_state_change(&self, state: &LoadState) {
        self.output(Output::LoadState(state.clone()));
    }

    fn on_controls_visibility_change(&self, visible: bool) {
        self.output(Output::ControlsVisibility(visible));
    }

    fn on_seek_indicator(&self, indicator: SeekIndicator) {
        self.output(Output::SeekIndicator(indicator));
    }

    fn on_fullscreen_change(&self, enabled: bool) {
        self.output(Output::Fullscreen(enabled));
    }
}

/// Observation of a playing media element, as reported right after `kind`.
pub(crate) fn observation(
    kind: MediaEventKind,
    current_time: f64,
    duration: f64,
) -> MediaObservation {
    MediaObservation::new(kind, current_time, duration, false, false, 1., false, 1.)
}

use crate::{bindings::SubscriptionId, utils::time_ranges::TimeRanges};

/// Capabilities of the playable surface and of the adaptive streaming client bound to it.
///
/// The player never talks to a media element or to a streaming library directly: everything
/// goes through this trait, so both can be swapped without touching the playback logic.
///
/// All methods take `&self`: the underlying objects live on the host side and the player
/// runs on a single thread.
pub trait MediaBackend {
    /// Returns `true` if the adaptive streaming client can run in this environment.
    fn supports_adaptive_client(&self) -> bool;

    /// Returns `true` if the media element can play the resource at `uri` on its own.
    fn supports_native_playback(&self, uri: &str) -> bool;

    /// Create a new adaptive client. A previous client is always destroyed before.
    fn create_client(&self);

    /// Ask the adaptive client to fetch and parse the manifest at `uri`.
    fn load_manifest(&self, uri: &str);

    /// Bind the adaptive client to the media element and start preloading.
    fn attach_client(&self);

    /// Detach and free the adaptive client. Does nothing if there's none.
    fn destroy_client(&self);

    /// Index of the rendition level currently selected by the adaptive client.
    fn current_level(&self) -> Option<u32>;

    /// Force the adaptive client to the rendition level at `index`.
    fn set_current_level(&self, index: u32);

    /// Restart segment loading from `position`, in seconds.
    fn start_load(&self, position: f64);

    /// Run the adaptive client's own recovery procedure for media decoding errors.
    fn recover_media_error(&self);

    /// Play `uri` directly through the media element.
    fn set_native_source(&self, uri: &str);

    /// Remove the media element's current source.
    fn clear_source(&self);

    fn play(&self);
    fn pause(&self);
    fn seek(&self, position: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_playback_rate(&self, rate: f64);

    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;

    /// Ranges currently buffered by the media element.
    fn buffered(&self) -> TimeRanges;

    /// Register media and adaptive client event listeners.
    fn add_listeners(&self) -> SubscriptionId;

    /// Remove listeners previously registered through `add_listeners`.
    fn remove_listeners(&self, id: SubscriptionId);
}

use crate::Logger;

/// One bitrate/resolution variant of the current content, as announced by the manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenditionLevel {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub bitrate: u32,
}

impl RenditionLevel {
    /// Build the list of levels from a flat `[width, height, bitrate, ...]` list, as
    /// communicated by the JavaScript-side. The position of a triplet is its level index.
    pub(crate) fn list_from_flat(flat: &[u32]) -> Vec<RenditionLevel> {
        flat.chunks_exact(3)
            .zip(0u32..)
            .filter_map(|(chunk, index)| match chunk {
                [width, height, bitrate] => Some(RenditionLevel {
                    index,
                    width: *width,
                    height: *height,
                    bitrate: *bitrate,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Access to the rendition level selected by the adaptive client.
pub(crate) trait LevelControl {
    fn current_level(&self) -> Option<u32>;
    fn set_current_level(&mut self, index: u32);
}

/// Pick the level whose height is the closest to `target_height`.
///
/// An exact match is always the closest. Ties are resolved in favor of the lowest index.
/// Returns `None` for an empty list.
pub(crate) fn select_target(levels: &[RenditionLevel], target_height: u32) -> Option<u32> {
    levels
        .iter()
        .min_by_key(|l| (l.height.abs_diff(target_height), l.index))
        .map(|l| l.index)
}

/// Pins playback to the rendition closest to a wanted height, once per manifest.
///
/// Pinning more than once would fight the adaptive client's own bitrate ladder each time
/// a level is loaded, so the pin is only re-evaluated after `reset`.
pub(crate) struct QualityController {
    target_height: u32,

    /// Level chosen for the current manifest, if one.
    chosen: Option<u32>,

    /// Set once the pin has been applied for the current manifest.
    pinned: bool,
}

impl QualityController {
    pub(crate) fn new(target_height: u32) -> Self {
        Self {
            target_height,
            chosen: None,
            pinned: false,
        }
    }

    pub(crate) fn set_target_height(&mut self, target_height: u32) {
        self.target_height = target_height;
    }

    /// Level chosen for the current manifest, if one.
    pub(crate) fn chosen(&self) -> Option<u32> {
        self.chosen
    }

    /// Forget the pin of the previous manifest. To call for each new session.
    pub(crate) fn reset(&mut self) {
        self.chosen = None;
        self.pinned = false;
    }

    /// Method to call once the levels of a newly-parsed manifest are known.
    pub(crate) fn on_levels_available(
        &mut self,
        levels: &[RenditionLevel],
        client: &mut dyn LevelControl,
    ) {
        self.pinned = false;
        self.chosen = select_target(levels, self.target_height);
        match self.chosen {
            Some(index) => {
                Logger::lazy_info(&|| {
                    format!(
                        "Quality: Target {}p resolved to level {index}",
                        self.target_height
                    )
                });
                self.apply(index, client);
            }
            None => Logger::debug("Quality: No level to select"),
        }
    }

    /// Method to call each time the adaptive client loaded a level.
    pub(crate) fn on_level_loaded(&mut self, client: &mut dyn LevelControl) {
        if let Some(index) = self.chosen {
            self.apply(index, client);
        }
    }

    /// Switch the adaptive client to level `index` unless it is already playing it or the
    /// pin was already applied.
    pub(crate) fn apply(&mut self, index: u32, client: &mut dyn LevelControl) {
        if self.pinned {
            return;
        }
        self.pinned = true;
        if client.current_level() != Some(index) {
            Logger::lazy_debug(&|| format!("Quality: Pinning level {index}"));
            client.set_current_level(index);
        }
    }
}

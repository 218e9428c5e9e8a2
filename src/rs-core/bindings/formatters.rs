use super::{ErrorClass, LoadStateCode};
use crate::{adaptive::RenditionLevel, dispatcher::LoadState};

/// Flatten `levels` into the `[width, height, bitrate, ...]` list expected by
/// `jsAnnounceLevels`. Levels are expected to be sorted by index.
pub(crate) fn format_levels_for_js(levels: &[RenditionLevel]) -> Vec<u32> {
    let mut ret: Vec<u32> = Vec::with_capacity(levels.len() * 3);
    levels.iter().for_each(|l| {
        ret.push(l.width);
        ret.push(l.height);
        ret.push(l.bitrate);
    });
    ret
}

/// Split a `LoadState` into the arguments of `jsAnnounceLoadState`, plus those of
/// `jsAnnounceLoadFailure` when it is a failure.
pub(crate) fn format_load_state_for_js(
    state: &LoadState,
) -> (LoadStateCode, u32, u32, Option<(ErrorClass, &str)>) {
    match state {
        LoadState::Idle => (LoadStateCode::Idle, 0, 0, None),
        LoadState::Loading => (LoadStateCode::Loading, 0, 0, None),
        LoadState::Retrying {
            attempt,
            max_attempts,
        } => (LoadStateCode::Retrying, *attempt, *max_attempts, None),
        LoadState::Ready => (LoadStateCode::Ready, 0, 0, None),
        LoadState::Failed { class, message } => {
            (LoadStateCode::Failed, 0, 0, Some((*class, message.as_str())))
        }
    }
}

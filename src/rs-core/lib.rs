#![allow(dead_code)]

use wasm_bindgen::prelude::*;

mod adaptive;
mod bindings;
mod controls;
pub mod dispatcher;
mod media_session;
mod progress;
mod stall_recovery;
mod supervisor;
mod timers;
mod utils;

#[cfg(test)]
mod test_utils;

pub use adaptive::RenditionLevel;
pub use bindings::{
    ErrorClass, JsHost, LoadStateCode, SeekIndicator, SubscriptionId, TimerId, TimerReason,
};
pub use media_session::{MediaBackend, PlaybackState, SessionError, StreamSource};
pub use progress::ProgressSample;
pub use supervisor::{LoadFailure, RetryState};
pub use timers::Scheduler;
pub use utils::{
    logger::{Logger, LoggerLevel},
    time_ranges::{TimeRange, TimeRanges},
};

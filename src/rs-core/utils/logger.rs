use std::sync::atomic::{AtomicU8, Ordering};

use crate::bindings::LogLevel;

static MAX_LOG_LEVEL: AtomicU8 = AtomicU8::new(LoggerLevel::Info as u8);

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum LoggerLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl From<u8> for LoggerLevel {
    fn from(val: u8) -> Self {
        match val {
            0 => LoggerLevel::None,
            1 => LoggerLevel::Error,
            2 => LoggerLevel::Warn,
            3 => LoggerLevel::Info,
            _ => LoggerLevel::Debug,
        }
    }
}

/// Logging facade used by every part of the player.
///
/// Logs are filtered here according to the current `LoggerLevel` before being
/// forwarded to the JavaScript console (through `jsLog`) when running as a
/// WebAssembly module, or to `tracing` otherwise.
pub struct Logger {}

impl Logger {
    pub fn set_logger_level(new_level: LoggerLevel) {
        MAX_LOG_LEVEL.store(new_level as u8, Ordering::Relaxed);
    }

    pub fn info(text: &str) {
        if Self::is_enabled(LoggerLevel::Info) {
            emit(LogLevel::Info, text);
        }
    }

    pub fn error(text: &str) {
        if Self::is_enabled(LoggerLevel::Error) {
            emit(LogLevel::Error, text);
        }
    }

    pub fn warn(text: &str) {
        if Self::is_enabled(LoggerLevel::Warn) {
            emit(LogLevel::Warn, text);
        }
    }

    pub fn debug(text: &str) {
        if Self::is_enabled(LoggerLevel::Debug) {
            emit(LogLevel::Debug, text);
        }
    }

    pub fn lazy_info(func: &dyn Fn() -> String) {
        if Self::is_enabled(LoggerLevel::Info) {
            emit(LogLevel::Info, &func());
        }
    }

    pub fn lazy_error(func: &dyn Fn() -> String) {
        if Self::is_enabled(LoggerLevel::Error) {
            emit(LogLevel::Error, &func());
        }
    }

    pub fn lazy_warn(func: &dyn Fn() -> String) {
        if Self::is_enabled(LoggerLevel::Warn) {
            emit(LogLevel::Warn, &func());
        }
    }

    pub fn lazy_debug(func: &dyn Fn() -> String) {
        if Self::is_enabled(LoggerLevel::Debug) {
            emit(LogLevel::Debug, &func());
        }
    }

    #[inline(always)]
    fn is_enabled(level: LoggerLevel) -> bool {
        MAX_LOG_LEVEL.load(Ordering::Relaxed) >= level as u8
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: LogLevel, text: &str) {
    crate::bindings::jsLog(level, text);
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(level: LogLevel, text: &str) {
    match level {
        LogLevel::Error => tracing::error!(target: "adaptive_player", "{}", text),
        LogLevel::Warn => tracing::warn!(target: "adaptive_player", "{}", text),
        LogLevel::Info => tracing::info!(target: "adaptive_player", "{}", text),
        LogLevel::Debug => tracing::debug!(target: "adaptive_player", "{}", text),
    }
}

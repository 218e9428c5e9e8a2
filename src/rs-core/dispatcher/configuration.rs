use serde::Deserialize;
use thiserror::Error;

/// Tunable parameters of the player.
///
/// Can be updated at any time from a JSON object through the `Dispatcher`'s
/// `update_configuration` method, where absent keys keep their default value.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfiguration {
    /// Height, in pixels, of the rendition to pin playback to.
    pub target_height: u32,

    /// Amount of seconds a double tap seeks backward or forward.
    pub seek_amount_seconds: f64,

    /// Maximum delay between two taps of a double tap, in milliseconds.
    pub tap_window_ms: f64,

    /// How long the double tap indicator stays displayed, in milliseconds.
    pub seek_indicator_ms: f64,

    /// Delay without pointer activity after which controls are hidden during playback, in
    /// milliseconds.
    pub controls_idle_ms: f64,

    /// Minimum delay between two stall recovery attempts, in milliseconds.
    pub stall_cooldown_ms: f64,

    /// Delay let to a stall to resolve by itself before acting, in milliseconds.
    pub stall_grace_ms: f64,

    /// Maximum forward jump performed to cross a small gap in the buffer, in seconds.
    pub stall_nudge_seconds: f64,

    /// Minimum delay between two time-based progress reports, in milliseconds.
    pub progress_throttle_ms: f64,

    /// Percentages whose crossing is always reported.
    pub milestones: Vec<u32>,

    /// Maximum number of attempts on network errors, the first load included.
    pub max_network_retries: u32,

    /// The n-th automatic retry is performed after `n * retry_backoff_step_ms`.
    pub retry_backoff_step_ms: f64,
}

impl Default for PlayerConfiguration {
    fn default() -> Self {
        Self {
            target_height: 720,
            seek_amount_seconds: 5.,
            tap_window_ms: 300.,
            seek_indicator_ms: 1000.,
            controls_idle_ms: 3000.,
            stall_cooldown_ms: 3000.,
            stall_grace_ms: 1000.,
            stall_nudge_seconds: 0.5,
            progress_throttle_ms: 5000.,
            milestones: vec![25, 50, 75, 95],
            max_network_retries: 3,
            retry_backoff_step_ms: 1000.,
        }
    }
}

impl PlayerConfiguration {
    /// Parse a configuration from its JSON representation and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: PlayerConfiguration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let durations = [
            ("seekAmountSeconds", self.seek_amount_seconds),
            ("tapWindowMs", self.tap_window_ms),
            ("seekIndicatorMs", self.seek_indicator_ms),
            ("controlsIdleMs", self.controls_idle_ms),
            ("stallCooldownMs", self.stall_cooldown_ms),
            ("stallGraceMs", self.stall_grace_ms),
            ("stallNudgeSeconds", self.stall_nudge_seconds),
            ("progressThrottleMs", self.progress_throttle_ms),
            ("retryBackoffStepMs", self.retry_backoff_step_ms),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value < 0. {
                return Err(ConfigurationError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }
        if self.max_network_retries == 0 {
            return Err(ConfigurationError::Invalid {
                field: "maxNetworkRetries",
                reason: "at least one attempt is needed".to_owned(),
            });
        }
        if let Some(m) = self.milestones.iter().find(|m| **m == 0 || **m > 100) {
            return Err(ConfigurationError::Invalid {
                field: "milestones",
                reason: format!("{m} is not a percentage in 1..=100"),
            });
        }
        Ok(())
    }
}

/// Error that may be returned when updating the `PlayerConfiguration`.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid `{field}` configuration: {reason}")]
    Invalid { field: &'static str, reason: String },
}

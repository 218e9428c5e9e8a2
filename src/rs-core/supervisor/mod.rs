use thiserror::Error;

use crate::{
    bindings::{ErrorClass, TimerId, TimerReason},
    dispatcher::StreamErrorKind,
    timers::{Scheduler, Timer},
    Logger,
};

/// Automatic retry bookkeeping of the current source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub max_attempts: u32,
    pub last_error_class: Option<ErrorClass>,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            last_error_class: None,
        }
    }
}

/// Terminal failure: no automatic recovery will be attempted anymore.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum LoadFailure {
    #[error("Network error, gave up after {attempts} attempt(s): {details}")]
    RetriesExhausted { attempts: u32, details: String },
    #[error("Media error could not be recovered: {details}")]
    UnrecoverableMedia { details: String },
    #[error("Unsupported content: {details}")]
    Unsupported { details: String },
    #[error("Playback error: {details}")]
    Other { details: String },
}

impl LoadFailure {
    pub fn class(&self) -> ErrorClass {
        match self {
            LoadFailure::RetriesExhausted { .. } => ErrorClass::Network,
            LoadFailure::UnrecoverableMedia { .. } => ErrorClass::Media,
            LoadFailure::Unsupported { .. } => ErrorClass::Unsupported,
            LoadFailure::Other { .. } => ErrorClass::Unknown,
        }
    }
}

/// What to do about a fatal error.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SupervisorDecision {
    /// A rebuild of the session has been scheduled, after the given backoff.
    RebuildScheduled { attempt: u32, delay_ms: f64 },

    /// Let the adaptive client recover from a media error by itself.
    RecoverMediaError { details: String },

    /// Stop playback and display the failure.
    Fail(LoadFailure),

    /// A terminal failure already happened, nothing more is done.
    Ignored,
}

/// Classifies fatal errors and drives a bounded retry-with-backoff loop.
pub(crate) struct ErrorSupervisor {
    retry: RetryState,

    /// Base of the linear backoff: the n-th retry is awaited `n * backoff_step_ms`.
    backoff_step_ms: f64,

    /// Set once the adaptive client's media error recovery has been tried.
    media_recovery_attempted: bool,

    /// Details of the last network error, reported if retries become exhausted.
    last_network_error: String,

    /// Set once a terminal failure happened.
    failure: Option<LoadFailure>,

    retry_timer: Timer,
}

impl ErrorSupervisor {
    pub(crate) fn new(max_attempts: u32, backoff_step_ms: f64) -> Self {
        Self {
            retry: RetryState::new(max_attempts),
            backoff_step_ms,
            media_recovery_attempted: false,
            last_network_error: String::new(),
            failure: None,
            retry_timer: Timer::new(TimerReason::RetryBackoff),
        }
    }

    /// Update the retry budget and backoff.
    ///
    /// The current attempt is brought back within the new budget. If that exhausts it while
    /// a rebuild is pending, the rebuild is cancelled and the failure returned.
    pub(crate) fn configure(
        &mut self,
        max_attempts: u32,
        backoff_step_ms: f64,
        scheduler: &dyn Scheduler,
    ) -> Option<SupervisorDecision> {
        self.retry.max_attempts = max_attempts;
        self.backoff_step_ms = backoff_step_ms;
        if self.retry.attempt < max_attempts {
            return None;
        }
        self.retry.attempt = max_attempts;
        if self.failure.is_some() || !self.retry_timer.is_pending() {
            return None;
        }
        self.retry_timer.cancel(scheduler);
        Some(self.fail(LoadFailure::RetriesExhausted {
            attempts: self.retry.attempt,
            details: self.last_network_error.clone(),
        }))
    }

    pub(crate) fn retry_state(&self) -> &RetryState {
        &self.retry
    }

    /// Method to call on each fatal error reported by the `MediaSession`.
    pub(crate) fn on_fatal_error(
        &mut self,
        kind: StreamErrorKind,
        details: String,
        scheduler: &dyn Scheduler,
    ) -> SupervisorDecision {
        if self.failure.is_some() {
            return SupervisorDecision::Ignored;
        }
        match kind {
            StreamErrorKind::Network => {
                self.retry.last_error_class = Some(ErrorClass::Network);
                self.last_network_error.clone_from(&details);
                self.retry.attempt = (self.retry.attempt + 1).min(self.retry.max_attempts);
                if self.retry.attempt < self.retry.max_attempts {
                    let attempt = self.retry.attempt;
                    let delay_ms = f64::from(attempt) * self.backoff_step_ms;
                    Logger::lazy_warn(&|| {
                        format!(
                            "Supervisor: Network error ({details}), retry {attempt}/{} in {}ms",
                            self.retry.max_attempts, delay_ms
                        )
                    });
                    self.retry_timer.arm(scheduler, delay_ms);
                    SupervisorDecision::RebuildScheduled { attempt, delay_ms }
                } else {
                    self.fail(LoadFailure::RetriesExhausted {
                        attempts: self.retry.attempt,
                        details,
                    })
                }
            }
            StreamErrorKind::Media => {
                self.retry.last_error_class = Some(ErrorClass::Media);
                if self.media_recovery_attempted {
                    self.fail(LoadFailure::UnrecoverableMedia { details })
                } else {
                    Logger::lazy_warn(&|| {
                        format!("Supervisor: Media error ({details}), recovering")
                    });
                    self.media_recovery_attempted = true;
                    SupervisorDecision::RecoverMediaError { details }
                }
            }
            StreamErrorKind::Other => {
                self.retry.last_error_class = Some(ErrorClass::Unknown);
                self.fail(LoadFailure::Other { details })
            }
        }
    }

    /// Method to call when a `RecoverMediaError` decision could not be applied, for example
    /// because the content is played without adaptive client.
    pub(crate) fn on_recovery_unavailable(&mut self, details: String) -> SupervisorDecision {
        self.fail(LoadFailure::UnrecoverableMedia { details })
    }

    /// Method to call when a source could not even be opened because of its format.
    pub(crate) fn on_unsupported(&mut self, details: String) -> SupervisorDecision {
        self.retry.last_error_class = Some(ErrorClass::Unsupported);
        self.fail(LoadFailure::Unsupported { details })
    }

    /// Method to call once a `RetryBackoff` timer elapsed.
    ///
    /// Returns `true` if the session should now be rebuilt.
    pub(crate) fn on_backoff_elapsed(&mut self, id: TimerId) -> bool {
        self.retry_timer.fire(id) && self.failure.is_none()
    }

    /// Forget every failure and retry, for a manual retry or a new source.
    pub(crate) fn reset(&mut self, scheduler: &dyn Scheduler) {
        self.retry_timer.cancel(scheduler);
        self.retry = RetryState::new(self.retry.max_attempts);
        self.media_recovery_attempted = false;
        self.last_network_error.clear();
        self.failure = None;
    }

    fn fail(&mut self, failure: LoadFailure) -> SupervisorDecision {
        Logger::lazy_error(&|| format!("Supervisor: Giving up: {failure}"));
        self.failure = Some(failure.clone());
        SupervisorDecision::Fail(failure)
    }
}

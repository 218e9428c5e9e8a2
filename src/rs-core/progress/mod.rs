use crate::Logger;

/// Progress measurement emitted to the progress-persistence collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSample {
    pub percent: u32,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    /// Timestamp of the measurement, in milliseconds.
    pub timestamp: f64,
}

/// Turns time updates into rate-limited `ProgressSample`s and performs the initial resume
/// seek.
///
/// A sample is emitted when the throttle interval elapsed since the last one, or when a
/// milestone percentage has just been crossed. Each milestone is reported at most once per
/// session: going back before it and crossing it again does not trigger a new emission.
pub(crate) struct ProgressReporter {
    /// Minimum delay between two time-based emissions, in milliseconds.
    throttle_ms: f64,

    /// Percentages whose crossing forces an emission.
    milestones: Vec<u32>,

    /// Milestones already reported in the current session.
    reached_milestones: Vec<u32>,

    /// Position to resume at, in percent of the duration. `0` to start from the beginning.
    resume_percent: f64,

    /// Set once the resume seek has been performed (or considered unneeded).
    resume_applied: bool,

    /// Set while the resume seek has been asked but not completed yet.
    resume_seek_pending: bool,

    /// Timestamp of the last emitted sample.
    last_emission: Option<f64>,

    /// Percentage computed on the previous time update.
    last_percent: Option<u32>,
}

impl ProgressReporter {
    pub(crate) fn new(throttle_ms: f64, milestones: Vec<u32>) -> Self {
        Self {
            throttle_ms,
            milestones,
            reached_milestones: vec![],
            resume_percent: 0.,
            resume_applied: false,
            resume_seek_pending: false,
            last_emission: None,
            last_percent: None,
        }
    }

    pub(crate) fn configure(&mut self, throttle_ms: f64, milestones: Vec<u32>) {
        self.throttle_ms = throttle_ms;
        self.milestones = milestones;
    }

    /// Reset the reporter for a new session that should resume at `resume_percent`.
    pub(crate) fn reset(&mut self, resume_percent: f64) {
        self.resume_percent = if resume_percent.is_finite() {
            resume_percent.clamp(0., 100.)
        } else {
            0.
        };
        self.resume_applied = false;
        self.resume_seek_pending = false;
        self.reached_milestones.clear();
        self.last_emission = None;
        self.last_percent = None;
    }

    /// Percentage the current session was asked to resume at.
    pub(crate) fn resume_percent(&self) -> f64 {
        self.resume_percent
    }

    /// Last percentage measured in the current session, if any.
    pub(crate) fn last_percent(&self) -> Option<u32> {
        self.last_percent
    }

    /// Method to call when the content's duration becomes known.
    ///
    /// Returns the position to seek to, only the first time it is called in a session with a
    /// strictly positive duration and a resume position.
    pub(crate) fn on_metadata_ready(&mut self, duration: f64) -> Option<f64> {
        if self.resume_applied || !(duration > 0.) {
            return None;
        }
        self.resume_applied = true;
        if self.resume_percent > 0. {
            let seek_time = self.resume_percent / 100. * duration;
            Logger::lazy_info(&|| {
                format!("Progress: Resuming at {seek_time}s ({}%)", self.resume_percent)
            });
            self.resume_seek_pending = true;
            Some(seek_time)
        } else {
            None
        }
    }

    /// Method to call once a seek completed.
    pub(crate) fn on_seek_completed(&mut self) {
        self.resume_seek_pending = false;
    }

    /// Method to call on each time update, with `now` the current timestamp in milliseconds.
    ///
    /// Returns the sample to emit, if one.
    pub(crate) fn on_time_update(
        &mut self,
        current_time: f64,
        duration: f64,
        now: f64,
    ) -> Option<ProgressSample> {
        if !(duration > 0.) || self.resume_seek_pending {
            return None;
        }
        let percent = compute_percent(current_time, duration);
        let previous = self.last_percent.replace(percent);

        let crossed = self.crossed_milestone(previous, percent);
        let throttle_elapsed = self
            .last_emission
            .map_or(true, |last| now - last >= self.throttle_ms);
        if !crossed && !throttle_elapsed {
            return None;
        }
        self.last_emission = Some(now);
        Some(ProgressSample {
            percent,
            current_time_seconds: current_time,
            duration_seconds: duration,
            timestamp: now,
        })
    }

    /// Record and return whether a not-yet-reached milestone lies in `(previous, percent]`.
    fn crossed_milestone(&mut self, previous: Option<u32>, percent: u32) -> bool {
        let previous = match previous {
            Some(previous) if previous < percent => previous,
            _ => return false,
        };
        let mut crossed = false;
        for milestone in &self.milestones {
            if previous < *milestone
                && *milestone <= percent
                && !self.reached_milestones.contains(milestone)
            {
                Logger::lazy_debug(&|| format!("Progress: Milestone {milestone}% reached"));
                self.reached_milestones.push(*milestone);
                crossed = true;
            }
        }
        crossed
    }
}

/// `floor(current_time / duration * 100)`, bounded to `[0, 100]`.
fn compute_percent(current_time: f64, duration: f64) -> u32 {
    let ratio = (current_time / duration * 100.).floor();
    if ratio.is_nan() || ratio <= 0. {
        0
    } else if ratio >= 100. {
        100
    } else {
        ratio as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> ProgressReporter {
        ProgressReporter::new(5000., vec![25, 50, 75, 95])
    }

    #[test]
    fn test_compute_percent() {
        assert_eq!(compute_percent(0., 100.), 0);
        assert_eq!(compute_percent(33.9, 100.), 33);
        assert_eq!(compute_percent(60., 60.), 100);
        assert_eq!(compute_percent(70., 60.), 100);
        assert_eq!(compute_percent(-1., 60.), 0);
    }

    #[test]
    fn test_resume_seek_fires_once() {
        let mut reporter = reporter();
        reporter.reset(40.);
        assert_eq!(reporter.on_metadata_ready(100.), Some(40.));
        reporter.on_seek_completed();
        assert_eq!(reporter.on_metadata_ready(100.), None);
    }

    #[test]
    fn test_resume_waits_for_known_duration() {
        let mut reporter = reporter();
        reporter.reset(40.);
        assert_eq!(reporter.on_metadata_ready(0.), None);
        assert_eq!(reporter.on_metadata_ready(f64::NAN), None);
        assert_eq!(reporter.on_metadata_ready(200.), Some(80.));
    }

    #[test]
    fn test_no_resume_without_initial_progress() {
        let mut reporter = reporter();
        reporter.reset(0.);
        assert_eq!(reporter.on_metadata_ready(100.), None);
        reporter.reset(-20.);
        assert_eq!(reporter.on_metadata_ready(100.), None);
    }

    #[test]
    fn test_throttled_emissions() {
        let mut reporter = reporter();
        reporter.reset(0.);
        let emissions = (0..30)
            .filter_map(|sec| {
                let sec = f64::from(sec);
                reporter.on_time_update(sec, 1000., sec * 1000.)
            })
            .count();
        assert_eq!(emissions, 6);
    }

    #[test]
    fn test_milestone_crossed_by_jump() {
        let mut reporter = reporter();
        reporter.reset(0.);
        assert!(reporter.on_time_update(20., 100., 0.).is_some());
        let sample = reporter.on_time_update(30., 100., 1000.).unwrap();
        assert_eq!(sample.percent, 30);
        assert!(reporter.on_time_update(31., 100., 2000.).is_none());
    }

    #[test]
    fn test_milestone_emitted_once_per_session() {
        let mut reporter = reporter();
        reporter.reset(0.);
        reporter.on_time_update(24., 100., 0.);
        assert!(reporter.on_time_update(25., 100., 500.).is_some());
        assert!(reporter.on_time_update(24., 100., 1000.).is_none());
        assert!(reporter.on_time_update(25., 100., 1500.).is_none());

        reporter.reset(0.);
        reporter.on_time_update(24., 100., 10_000.);
        assert!(reporter.on_time_update(25., 100., 10_500.).is_some());
    }

    #[test]
    fn test_no_emission_during_resume_seek() {
        let mut reporter = reporter();
        reporter.reset(50.);
        reporter.on_metadata_ready(100.);
        assert!(reporter.on_time_update(0., 100., 0.).is_none());
        reporter.on_seek_completed();
        let sample = reporter.on_time_update(50., 100., 100.).unwrap();
        assert_eq!(sample.percent, 50);
    }

    #[test]
    fn test_no_emission_without_duration() {
        let mut reporter = reporter();
        reporter.reset(0.);
        assert!(reporter.on_time_update(3., 0., 0.).is_none());
    }
}

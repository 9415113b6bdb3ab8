/*!
 * Remaining-time estimation from completed-caption timings.
 *
 * One estimator is constructed per file and fed the elapsed wall time of
 * each completed caption; the estimate is a plain running average scaled by
 * the remaining caption count. Below a minimum sample count the average is
 * too noisy to show, so an indeterminate status is reported instead.
 */

use std::fmt;
use std::time::Duration;

/// Completed captions required before a numeric estimate is shown
pub const MIN_SAMPLES: usize = 10;

/// Remaining-time estimate for the captions still to translate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate {
    /// Not enough samples yet
    Warmup,

    /// Estimated remaining duration
    Remaining(Duration),
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Estimate::Warmup => write!(f, "Please wait..."),
            Estimate::Remaining(duration) => {
                let total_seconds = duration.as_secs();
                let hours = total_seconds / 3600;
                let minutes = (total_seconds % 3600) / 60;
                let seconds = total_seconds % 60;
                write!(f, "{}h {}m {}s", hours, minutes, seconds)
            }
        }
    }
}

/// Running-average remaining-time estimator, one per file
#[derive(Debug)]
pub struct ProgressEstimator {
    /// Sum of per-caption elapsed times
    total: Duration,

    /// Number of captions recorded
    completed: usize,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimator {
    pub fn new() -> Self {
        ProgressEstimator {
            total: Duration::ZERO,
            completed: 0,
        }
    }

    /// Record the elapsed time of one completed caption
    pub fn record(&mut self, elapsed: Duration) {
        self.total += elapsed;
        self.completed += 1;
    }

    /// Number of captions recorded so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Estimate the remaining time for `remaining` captions
    pub fn estimate(&self, remaining: usize) -> Estimate {
        if self.completed < MIN_SAMPLES {
            return Estimate::Warmup;
        }

        let average = self.total / self.completed as u32;
        Estimate::Remaining(average * remaining as u32)
    }
}

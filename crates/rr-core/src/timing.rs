//! Lightweight wall-clock timing for solve summaries.

use std::time::Instant;

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Seconds elapsed since the timer was started.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.elapsed_s()
    }
}

/// Median of a set of timings in seconds (0 when empty).
pub fn median_s(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

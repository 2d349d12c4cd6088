//! Generation metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::{counter, histogram};

/// Metric name constants.
pub mod names {
    /// Completed `generate` calls by outcome.
    pub const GENERATIONS_TOTAL: &str = "promo_generations_total";

    /// Backend attempts by outcome.
    pub const ATTEMPTS_TOTAL: &str = "promo_generation_attempts_total";

    /// End-to-end duration of a `generate` call.
    pub const DURATION_SECONDS: &str = "promo_generation_duration_seconds";

    /// Duration of the post-processing step.
    pub const TRANSFORM_SECONDS: &str = "promo_transform_duration_seconds";
}

/// Record the outcome of one backend attempt.
pub fn record_attempt(outcome: &'static str) {
    counter!(names::ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a finished `generate` call.
pub fn record_generation(outcome: &'static str, elapsed_secs: f64) {
    counter!(names::GENERATIONS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::DURATION_SECONDS, "outcome" => outcome).record(elapsed_secs);
}

pub fn record_transform(elapsed_secs: f64) {
    histogram!(names::TRANSFORM_SECONDS).record(elapsed_secs);
}

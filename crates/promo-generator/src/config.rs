//! Generator configuration.

use std::path::PathBuf;
use std::time::Duration;

use promo_models::{Resolution, SquareStrategy, DEFAULT_START_TRIM_SECONDS};
use tracing::warn;

/// Default number of generation attempts per request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Attempts for requests built with `VideoGenerator::request`
    pub max_retries: u32,
    /// Seconds cut from the head of each generated clip
    pub start_trim_seconds: f64,
    /// How 1:1 requests are squared
    pub square_strategy: SquareStrategy,
    /// Ceiling for one submit-and-wait on the backend
    pub submit_timeout: Duration,
    /// Resolution sent to the backend
    pub resolution: Resolution,
    /// Parent directory for transform temp dirs
    pub work_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            start_trim_seconds: DEFAULT_START_TRIM_SECONDS,
            square_strategy: SquareStrategy::Crop,
            submit_timeout: Duration::from_secs(15 * 60),
            resolution: Resolution::Auto,
            work_dir: std::env::temp_dir().join("promo-video"),
        }
    }
}

impl GeneratorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let square_strategy = match std::env::var("GENERATION_SQUARE_STRATEGY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, using {}", e, defaults.square_strategy);
                defaults.square_strategy
            }),
            Err(_) => defaults.square_strategy,
        };

        Self {
            max_retries: std::env::var("GENERATION_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_retries),
            submit_timeout: std::env::var("GENERATION_SUBMIT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.submit_timeout),
            work_dir: std::env::var("GENERATION_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| defaults.work_dir.clone()),
            square_strategy,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!((config.start_trim_seconds - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.square_strategy, SquareStrategy::Crop);
        assert_eq!(config.submit_timeout, Duration::from_secs(900));
        assert_eq!(config.resolution, Resolution::Auto);
    }
}

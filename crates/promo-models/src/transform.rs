//! Post-processing transform description.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Seconds dropped from the head of every generated character video.
///
/// The first fraction of a second from the generator is consistently
/// artifact-laden.
pub const DEFAULT_START_TRIM_SECONDS: f64 = 0.3;

/// How a square (1:1) output is produced from a non-square source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SquareStrategy {
    /// Centered square crop, discards edge content
    #[default]
    Crop,
    /// Black padding, keeps the full frame
    Letterbox,
}

impl SquareStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquareStrategy::Crop => "crop",
            SquareStrategy::Letterbox => "letterbox",
        }
    }
}

impl fmt::Display for SquareStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SquareStrategy {
    type Err = SquareStrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crop" => Ok(SquareStrategy::Crop),
            "letterbox" | "pad" => Ok(SquareStrategy::Letterbox),
            _ => Err(SquareStrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown square strategy: {0}")]
pub struct SquareStrategyParseError(String);

/// Transform applied to a generated clip before it is returned.
///
/// `square_crop` and `letterbox` are alternative ways to reach a 1:1 frame;
/// at most one of them may be set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct TransformSpec {
    /// Content before this timestamp is dropped
    #[serde(default)]
    pub start_trim_seconds: f64,
    /// Center-crop to a square of the shorter side
    #[serde(default)]
    pub square_crop: bool,
    /// Pad to a square of the longer side with black bars
    #[serde(default)]
    pub letterbox: bool,
}

impl TransformSpec {
    /// Trim only, keep the frame as generated.
    pub fn trim(start_trim_seconds: f64) -> Self {
        Self {
            start_trim_seconds,
            square_crop: false,
            letterbox: false,
        }
    }

    /// Trim, then square the frame with the given strategy.
    pub fn square(start_trim_seconds: f64, strategy: SquareStrategy) -> Self {
        Self {
            start_trim_seconds,
            square_crop: strategy == SquareStrategy::Crop,
            letterbox: strategy == SquareStrategy::Letterbox,
        }
    }

    /// Whether the output frame is square.
    pub fn is_square(&self) -> bool {
        self.square_crop || self.letterbox
    }

    /// Whether the transform leaves timing and geometry untouched.
    pub fn is_noop(&self) -> bool {
        self.start_trim_seconds <= 0.0 && !self.is_square()
    }

    /// Check the invariants of the transform.
    pub fn validate(&self) -> Result<(), TransformSpecError> {
        if !self.start_trim_seconds.is_finite() || self.start_trim_seconds < 0.0 {
            return Err(TransformSpecError::InvalidTrim(self.start_trim_seconds));
        }
        if self.square_crop && self.letterbox {
            return Err(TransformSpecError::ConflictingSquareStrategies);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TransformSpecError {
    #[error("Start trim must be a finite, non-negative number of seconds, got {0}")]
    InvalidTrim(f64),

    #[error("square_crop and letterbox are mutually exclusive")]
    ConflictingSquareStrategies,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_constructor_sets_exactly_one_strategy() {
        let crop = TransformSpec::square(0.3, SquareStrategy::Crop);
        assert!(crop.square_crop && !crop.letterbox);

        let pad = TransformSpec::square(0.3, SquareStrategy::Letterbox);
        assert!(!pad.square_crop && pad.letterbox);

        assert!(crop.validate().is_ok());
        assert!(pad.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_conflicts_and_bad_trim() {
        let both = TransformSpec {
            start_trim_seconds: 0.0,
            square_crop: true,
            letterbox: true,
        };
        assert_eq!(
            both.validate(),
            Err(TransformSpecError::ConflictingSquareStrategies)
        );

        assert!(TransformSpec::trim(-0.1).validate().is_err());
        assert!(TransformSpec::trim(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_noop() {
        assert!(TransformSpec::default().is_noop());
        assert!(!TransformSpec::trim(DEFAULT_START_TRIM_SECONDS).is_noop());
        assert!(!TransformSpec::square(0.0, SquareStrategy::Crop).is_noop());
    }

    #[test]
    fn test_square_strategy_parse() {
        assert_eq!("crop".parse::<SquareStrategy>().unwrap(), SquareStrategy::Crop);
        assert_eq!(
            "LETTERBOX".parse::<SquareStrategy>().unwrap(),
            SquareStrategy::Letterbox
        );
        assert!("stretch".parse::<SquareStrategy>().is_err());
    }
}

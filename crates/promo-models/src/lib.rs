//! Shared data models for the promo video generator.
//!
//! This crate provides Serde-serializable types for:
//! - Generation parameters (duration, aspect ratio, resolution)
//! - Post-processing transform specs and the square-output strategy
//! - Encoding configuration
//! - Marketing copy extracted from landing pages

pub mod encoding;
pub mod generation;
pub mod product;
pub mod transform;

// Re-export common types
pub use encoding::EncodingConfig;
pub use generation::{
    AspectRatio, AspectRatioParseError, DurationParseError, Resolution, VideoDuration,
};
pub use product::ProductInfo;
pub use transform::{
    SquareStrategy, SquareStrategyParseError, TransformSpec, TransformSpecError,
    DEFAULT_START_TRIM_SECONDS,
};

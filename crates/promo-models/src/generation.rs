//! Generation parameters accepted by the image-to-video backend.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Clip length supported by the generation backend.
///
/// Serialized as the bare number of seconds (`4`, `8` or `12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum VideoDuration {
    Four,
    Eight,
    /// Character videos use the full 12 seconds
    #[default]
    Twelve,
}

impl VideoDuration {
    pub const ALL: &'static [VideoDuration] = &[
        VideoDuration::Four,
        VideoDuration::Eight,
        VideoDuration::Twelve,
    ];

    /// Length in seconds.
    pub fn as_secs(&self) -> u32 {
        match self {
            VideoDuration::Four => 4,
            VideoDuration::Eight => 8,
            VideoDuration::Twelve => 12,
        }
    }
}

impl TryFrom<u32> for VideoDuration {
    type Error = DurationParseError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        match secs {
            4 => Ok(VideoDuration::Four),
            8 => Ok(VideoDuration::Eight),
            12 => Ok(VideoDuration::Twelve),
            other => Err(DurationParseError(other.to_string())),
        }
    }
}

impl From<VideoDuration> for u32 {
    fn from(d: VideoDuration) -> Self {
        d.as_secs()
    }
}

impl fmt::Display for VideoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_secs())
    }
}

impl FromStr for VideoDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('s');
        let secs: u32 = trimmed
            .parse()
            .map_err(|_| DurationParseError(s.to_string()))?;
        VideoDuration::try_from(secs)
    }
}

#[derive(Debug, Error)]
#[error("Unsupported video duration: {0} (expected 4, 8 or 12 seconds)")]
pub struct DurationParseError(String);

/// Output aspect ratio requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AspectRatio {
    /// Landscape
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait (TikTok/Reels)
    #[serde(rename = "9:16")]
    Portrait,
    /// Square. The backend has no native square mode.
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
        }
    }

    /// Ratio the backend is asked to generate.
    ///
    /// Square output is generated as portrait and squared in post-processing.
    pub fn for_submission(&self) -> AspectRatio {
        match self {
            AspectRatio::Square => AspectRatio::Portrait,
            other => *other,
        }
    }

    pub fn is_square(&self) -> bool {
        matches!(self, AspectRatio::Square)
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        match self {
            AspectRatio::Landscape => 16.0 / 9.0,
            AspectRatio::Portrait => 9.0 / 16.0,
            AspectRatio::Square => 1.0,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "1:1" => Ok(AspectRatio::Square),
            other => Err(AspectRatioParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported aspect ratio: {0} (expected 16:9, 9:16 or 1:1)")]
pub struct AspectRatioParseError(String);

/// Output resolution hint for the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Let the backend pick from the source image
    #[default]
    Auto,
    #[serde(rename = "720p")]
    P720,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Auto => "auto",
            Resolution::P720 => "720p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_accepts_backend_values() {
        assert_eq!(VideoDuration::try_from(4).unwrap(), VideoDuration::Four);
        assert_eq!(VideoDuration::try_from(8).unwrap(), VideoDuration::Eight);
        assert_eq!("12".parse::<VideoDuration>().unwrap(), VideoDuration::Twelve);
        assert_eq!("8s".parse::<VideoDuration>().unwrap(), VideoDuration::Eight);
    }

    #[test]
    fn test_duration_rejects_other_values() {
        assert!(VideoDuration::try_from(5).is_err());
        assert!(VideoDuration::try_from(0).is_err());
        assert!("ten".parse::<VideoDuration>().is_err());
        assert!(serde_json::from_str::<VideoDuration>("6").is_err());
    }

    #[test]
    fn test_duration_serializes_as_number() {
        assert_eq!(serde_json::to_string(&VideoDuration::Eight).unwrap(), "8");
        let d: VideoDuration = serde_json::from_str("4").unwrap();
        assert_eq!(d, VideoDuration::Four);
    }

    #[test]
    fn test_square_submits_as_portrait() {
        assert_eq!(AspectRatio::Square.for_submission(), AspectRatio::Portrait);
        assert_eq!(AspectRatio::Landscape.for_submission(), AspectRatio::Landscape);
        assert_eq!(AspectRatio::Portrait.for_submission(), AspectRatio::Portrait);
    }

    #[test]
    fn test_aspect_ratio_wire_format() {
        assert_eq!(serde_json::to_string(&AspectRatio::Square).unwrap(), "\"1:1\"");
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert!("4:3".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_resolution_wire_format() {
        assert_eq!(serde_json::to_string(&Resolution::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::to_string(&Resolution::P720).unwrap(), "\"720p\"");
    }
}

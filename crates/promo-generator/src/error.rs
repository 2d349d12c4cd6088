//! Generation error types.

use promo_models::{AspectRatioParseError, DurationParseError, TransformSpecError};
use thiserror::Error;

pub type GenerationResult<T> = Result<T, GenerationError>;

/// What to try when the backend keeps refusing the input image.
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Use an image with a simpler background",
    "Use a brightly lit image",
    "Avoid images that show the character's full body",
    "Try a logo or illustration instead of a photo of a person",
];

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rejected before any network call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Image upload failed: {0}")]
    Upload(String),

    /// Every attempt was refused by content moderation.
    #[error("Content policy violation after {attempts} attempt(s): {message}")]
    ContentPolicyViolation {
        message: String,
        attempts: u32,
        suggestions: Vec<String>,
    },

    #[error("Malformed backend response: {0}")]
    MalformedBackendResponse(String),

    #[error("Video generation failed: {0}")]
    VideoGeneration(String),

    #[error("Deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { attempts: u32 },

    /// Generation succeeded but post-processing did not.
    #[error("Post-processing failed for {video_url}: {message}")]
    Transform { message: String, video_url: String },
}

impl GenerationError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBackendResponse(msg.into())
    }

    pub fn video_generation(msg: impl Into<String>) -> Self {
        Self::VideoGeneration(msg.into())
    }

    /// Content-policy failure carrying the default remediation suggestions.
    pub fn content_policy(message: impl Into<String>, attempts: u32) -> Self {
        Self::ContentPolicyViolation {
            message: message.into(),
            attempts,
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether a new request with a different input could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ContentPolicyViolation { .. } | Self::DeadlineExceeded { .. }
        )
    }

    pub fn is_content_policy(&self) -> bool {
        matches!(self, Self::ContentPolicyViolation { .. })
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Stable identifier for logs, metrics and API responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Upload(_) => "upload_failed",
            Self::ContentPolicyViolation { .. } => "content_policy_violation",
            Self::MalformedBackendResponse(_) => "malformed_backend_response",
            Self::VideoGeneration(_) => "video_generation_failed",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Transform { .. } => "transform_failed",
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::ContentPolicyViolation { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Raw generated video URL, when generation got that far.
    pub fn video_url(&self) -> Option<&str> {
        match self {
            Self::Transform { video_url, .. } => Some(video_url),
            _ => None,
        }
    }
}

impl From<DurationParseError> for GenerationError {
    fn from(e: DurationParseError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<AspectRatioParseError> for GenerationError {
    fn from(e: AspectRatioParseError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<TransformSpecError> for GenerationError {
    fn from(e: TransformSpecError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_models::VideoDuration;

    #[test]
    fn test_content_policy_carries_suggestions() {
        let err = GenerationError::content_policy("blocked", 3);
        assert!(err.is_content_policy());
        assert!(err.is_retryable());
        assert_eq!(err.suggestions().len(), DEFAULT_SUGGESTIONS.len());
        assert_eq!(
            err.to_string(),
            "Content policy violation after 3 attempt(s): blocked"
        );
    }

    #[test]
    fn test_invalid_duration_is_caller_error() {
        let err: GenerationError = VideoDuration::try_from(6).unwrap_err().into();
        assert!(err.is_caller_error());
        assert!(!err.is_retryable());
        assert_eq!(err.error_type(), "invalid_request");
    }

    #[test]
    fn test_transform_keeps_video_url() {
        let err = GenerationError::Transform {
            message: "ffmpeg failed".into(),
            video_url: "https://v.example/raw.mp4".into(),
        };
        assert_eq!(err.video_url(), Some("https://v.example/raw.mp4"));
        assert!(GenerationError::upload("x").video_url().is_none());
        assert!(err.suggestions().is_empty());
    }
}

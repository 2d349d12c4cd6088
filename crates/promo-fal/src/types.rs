//! fal request and response types.

use promo_models::{AspectRatio, Resolution, VideoDuration};
use serde::{Deserialize, Serialize};

/// Input of the image-to-video model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationInput {
    pub image_url: String,
    pub prompt: String,
    pub duration: VideoDuration,
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
}

/// Output of the image-to-video model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub video: Option<VideoFile>,
}

impl GenerationOutput {
    /// URL of the generated video, when one was returned.
    pub fn video_url(&self) -> Option<&str> {
        self.video
            .as_ref()
            .and_then(|v| v.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    /// Absent when the model finished without producing a file
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadInitiateRequest<'a> {
    pub content_type: &'a str,
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadInitiateResponse {
    pub upload_url: String,
    pub file_url: String,
}

/// Handle to a request sitting on the fal queue.
#[derive(Debug, Clone, Deserialize)]
pub struct QueuedRequest {
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    InQueue,
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueStatus {
    pub status: QueueState,
    #[serde(default)]
    pub queue_position: Option<u32>,
    /// Set when a completed request failed
    #[serde(default)]
    pub error: Option<String>,
}

/// File extension used for an uploaded content type.
pub(crate) fn extension_for(content_type: &str) -> &'static str {
    match content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_wire_format() {
        let input = GenerationInput {
            image_url: "https://cdn.example/a.jpg".into(),
            prompt: "wave hello".into(),
            duration: VideoDuration::Twelve,
            resolution: Resolution::Auto,
            aspect_ratio: AspectRatio::Portrait,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["duration"], 12);
        assert_eq!(json["resolution"], "auto");
        assert_eq!(json["aspect_ratio"], "9:16");
    }

    #[test]
    fn test_output_video_url() {
        let out: GenerationOutput =
            serde_json::from_str(r#"{"video": {"url": "https://v.example/x.mp4"}}"#).unwrap();
        assert_eq!(out.video_url(), Some("https://v.example/x.mp4"));

        let empty: GenerationOutput = serde_json::from_str(r#"{"video_id": "abc"}"#).unwrap();
        assert!(empty.video_url().is_none());

        let blank: GenerationOutput = serde_json::from_str(r#"{"video": {"url": ""}}"#).unwrap();
        assert!(blank.video_url().is_none());

        let no_url: GenerationOutput =
            serde_json::from_str(r#"{"video": {"content_type": "video/mp4"}}"#).unwrap();
        assert!(no_url.video.is_some());
        assert!(no_url.video_url().is_none());
    }

    #[test]
    fn test_queue_state() {
        let status: QueueStatus =
            serde_json::from_str(r#"{"status": "IN_QUEUE", "queue_position": 3}"#).unwrap();
        assert_eq!(status.status, QueueState::InQueue);
        assert_eq!(status.queue_position, Some(3));

        let odd: QueueStatus = serde_json::from_str(r#"{"status": "PAUSED"}"#).unwrap();
        assert_eq!(odd.status, QueueState::Unknown);
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/PNG; charset=binary"), "png");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }
}

#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for generated-video post-processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - The transform engine (trim, square crop, letterbox, re-encode)
//! - Source image preparation for submission

pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod image_prep;
pub mod probe;
pub mod progress;
pub mod transform;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use download::{download_bytes, download_to_file, IMAGE_DOWNLOAD_TIMEOUT, VIDEO_DOWNLOAD_TIMEOUT};
pub use error::{MediaError, MediaResult};
pub use filters::{build_transform_filter, center_square_crop, center_square_pad, CropRegion, PadRegion};
pub use image_prep::preprocess_image;
pub use probe::{probe_video, VideoInfo};
pub use progress::FfmpegProgress;
pub use transform::{TransformConfig, TransformEngine, TransformedVideo, VideoSource};

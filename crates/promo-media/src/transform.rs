//! Post-processing of generated clips: trim, square and re-encode.
//!
//! Every invocation works inside its own temporary directory under the
//! configured work dir. The directory and everything written into it is
//! removed when the call returns, whether it succeeded or not.

use std::path::{Path, PathBuf};
use std::time::Duration;

use promo_models::{EncodingConfig, TransformSpec};
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::download::{download_to_file, http_client, VIDEO_DOWNLOAD_TIMEOUT};
use crate::error::{MediaError, MediaResult};
use crate::filters::build_transform_filter;
use crate::probe::{probe_video, VideoInfo};

const SOURCE_FILE_NAME: &str = "source.mp4";
const OUTPUT_FILE_NAME: &str = "output.mp4";
const TEMP_DIR_PREFIX: &str = "promo-transform-";

/// Default ceiling for a single FFmpeg run.
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 600;

/// Transform engine configuration.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Parent directory for per-call temp dirs
    pub work_dir: PathBuf,
    /// Timeout for fetching a URL source
    pub download_timeout: Duration,
    /// Ceiling for the FFmpeg run
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Output encoding
    pub encoding: EncodingConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            download_timeout: VIDEO_DOWNLOAD_TIMEOUT,
            ffmpeg_timeout_secs: Some(DEFAULT_FFMPEG_TIMEOUT_SECS),
            encoding: EncodingConfig::default(),
        }
    }
}

impl TransformConfig {
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }
}

/// Where the clip to transform comes from.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Fetched over HTTP(S)
    Url(String),
    /// Already in memory
    Bytes(Vec<u8>),
    /// Existing file, read in place and never modified
    File(PathBuf),
}

impl VideoSource {
    fn describe(&self) -> String {
        match self {
            VideoSource::Url(url) => url.clone(),
            VideoSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            VideoSource::File(path) => path.display().to_string(),
        }
    }
}

/// Result of a transform.
#[derive(Debug, Clone)]
pub struct TransformedVideo {
    /// Encoded MP4
    pub data: Vec<u8>,
    /// Probe of the encoded output
    pub info: VideoInfo,
}

/// Applies a [`TransformSpec`] to a video with FFmpeg.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    config: TransformConfig,
    client: reqwest::Client,
    runner: FfmpegRunner,
}

impl TransformEngine {
    /// Create a new engine.
    pub fn new(config: TransformConfig) -> MediaResult<Self> {
        let client = http_client(config.download_timeout)?;
        let runner = match config.ffmpeg_timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };
        Ok(Self {
            config,
            client,
            runner,
        })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Trim and optionally square `source`, returning the re-encoded bytes.
    pub async fn transform(
        &self,
        source: VideoSource,
        spec: &TransformSpec,
    ) -> MediaResult<TransformedVideo> {
        spec.validate()
            .map_err(|e| MediaError::InvalidSpec(e.to_string()))?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let temp_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(&self.config.work_dir)?;

        debug!(
            source = %source.describe(),
            temp_dir = ?temp_dir.path(),
            "Starting transform"
        );

        let result = self.transform_in(temp_dir.path(), source, spec).await;

        // Dropping would also clean up; closing surfaces the error
        let temp_path = temp_dir.path().to_path_buf();
        if let Err(e) = temp_dir.close() {
            warn!(path = ?temp_path, error = %e, "Failed to remove transform temp dir");
        }

        result
    }

    async fn transform_in(
        &self,
        dir: &Path,
        source: VideoSource,
        spec: &TransformSpec,
    ) -> MediaResult<TransformedVideo> {
        let source_path = self.materialize(dir, source).await?;
        let source_info = probe_video(&source_path).await?;

        let trim = spec.start_trim_seconds;
        if trim > 0.0 && source_info.duration > 0.0 && trim >= source_info.duration {
            return Err(MediaError::InvalidSpec(format!(
                "Start trim {:.3}s is not shorter than the source ({:.3}s)",
                trim, source_info.duration
            )));
        }

        let output_path = dir.join(OUTPUT_FILE_NAME);
        let mut cmd = FfmpegCommand::new(&source_path, &output_path);
        if trim > 0.0 {
            cmd = cmd.seek(trim);
        }
        if let Some(filter) = build_transform_filter(spec, source_info.width, source_info.height) {
            cmd = cmd.video_filter(filter);
        }
        cmd = cmd.encoding(&self.config.encoding);

        let expected_ms = ((source_info.duration - trim).max(0.0) * 1000.0) as i64;
        self.runner
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    percent = format!("{:.0}", progress.percentage(expected_ms)),
                    speed = progress.speed,
                    "Transform progress"
                );
            })
            .await?;

        let info = probe_video(&output_path).await?;
        let data = tokio::fs::read(&output_path).await?;

        info!(
            source_width = source_info.width,
            source_height = source_info.height,
            width = info.width,
            height = info.height,
            duration = info.duration,
            bytes = data.len(),
            "Transform complete"
        );

        Ok(TransformedVideo { data, info })
    }

    /// Put the source where FFmpeg can read it.
    async fn materialize(&self, dir: &Path, source: VideoSource) -> MediaResult<PathBuf> {
        match source {
            VideoSource::Url(url) => {
                let path = dir.join(SOURCE_FILE_NAME);
                download_to_file(&self.client, &url, &path).await?;
                Ok(path)
            }
            VideoSource::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(MediaError::invalid_video("Empty video data"));
                }
                let path = dir.join(SOURCE_FILE_NAME);
                tokio::fs::write(&path, &bytes).await?;
                Ok(path)
            }
            VideoSource::File(path) => {
                if !path.exists() {
                    return Err(MediaError::FileNotFound(path));
                }
                Ok(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(work_dir: &Path) -> TransformEngine {
        TransformEngine::new(TransformConfig::default().with_work_dir(work_dir)).unwrap()
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_conflicting_spec_is_rejected() {
        let work = tempfile::tempdir().unwrap();
        let spec = TransformSpec {
            start_trim_seconds: 0.3,
            square_crop: true,
            letterbox: true,
        };

        let err = engine(work.path())
            .transform(VideoSource::Bytes(vec![0u8; 16]), &spec)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::InvalidSpec(_)));
        assert_eq!(entries(work.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_file_cleans_up() {
        let work = tempfile::tempdir().unwrap();

        let err = engine(work.path())
            .transform(
                VideoSource::File(work.path().join("nope.mp4")),
                &TransformSpec::trim(0.3),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FileNotFound(_)));
        assert_eq!(entries(work.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_bytes_cleans_up() {
        let work = tempfile::tempdir().unwrap();

        let err = engine(work.path())
            .transform(VideoSource::Bytes(Vec::new()), &TransformSpec::trim(0.3))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::InvalidVideo(_)));
        assert_eq!(entries(work.path()), 0);
    }

    #[test]
    fn test_source_description() {
        assert_eq!(VideoSource::Bytes(vec![1, 2, 3]).describe(), "<3 bytes>");
        assert_eq!(
            VideoSource::Url("https://v.example/a.mp4".into()).describe(),
            "https://v.example/a.mp4"
        );
    }
}

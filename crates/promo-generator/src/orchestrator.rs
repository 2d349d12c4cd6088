//! Generation orchestrator.
//!
//! One `generate` call uploads the image once, then runs up to
//! `max_retries` strictly sequential attempts against the backend. Only
//! content-policy refusals are retried, with the same input each time. The
//! first successful clip is trimmed, squared for 1:1 requests, and returned
//! as bytes.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use promo_fal::{FalError, GenerationInput};
use promo_media::VideoSource;
use promo_models::{AspectRatio, TransformSpec, VideoDuration};
use serde::Serialize;
use tracing::{debug, Instrument};

use crate::backend::{GenerationBackend, VideoTransformer};
use crate::classifier::{classify, ClassifiedError};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::logging::JobLogger;
use crate::metrics;

/// One video generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Source image, uploaded as is
    pub image: Vec<u8>,
    pub content_type: String,
    pub prompt: String,
    pub duration: VideoDuration,
    pub aspect_ratio: AspectRatio,
    /// Total attempts allowed, at least 1
    pub max_retries: u32,
    /// Checked between attempts; an attempt in flight is not interrupted
    pub deadline: Option<Instant>,
}

impl GenerationRequest {
    pub fn new(image: Vec<u8>, content_type: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image,
            content_type: content_type.into(),
            prompt: prompt.into(),
            duration: VideoDuration::default(),
            aspect_ratio: AspectRatio::default(),
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            deadline: None,
        }
    }

    pub fn with_duration(mut self, duration: VideoDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Caller errors, detected before any network call.
    pub fn validate(&self) -> GenerationResult<()> {
        if self.max_retries == 0 {
            return Err(GenerationError::invalid_request(
                "max_retries must be at least 1",
            ));
        }
        if self.image.is_empty() {
            return Err(GenerationError::invalid_request("image is empty"));
        }
        if self.content_type.trim().is_empty() {
            return Err(GenerationError::invalid_request("content type is empty"));
        }
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("prompt is empty"));
        }
        Ok(())
    }
}

/// Backend reference to the uploaded image.
///
/// Produced once per request and only ever borrowed afterwards.
#[derive(Debug)]
pub struct UploadedAsset(String);

impl UploadedAsset {
    fn new(url: String) -> Self {
        Self(url)
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

/// Outcome of a single backend attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success(String),
    RetryableFailure(ClassifiedError),
    FatalFailure(GenerationError),
}

/// Final result of a successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResult {
    /// Post-processed MP4
    #[serde(skip_serializing)]
    pub video_data: Vec<u8>,
    pub status: String,
    pub trimmed: bool,
    /// Raw clip as returned by the backend
    pub video_url: String,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Aspect ratio requested by the caller
    pub aspect_ratio: AspectRatio,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
}

/// Drives upload, attempts and post-processing for generation requests.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct VideoGenerator {
    backend: Arc<dyn GenerationBackend>,
    transformer: Arc<dyn VideoTransformer>,
    config: GeneratorConfig,
}

impl VideoGenerator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        transformer: Arc<dyn VideoTransformer>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            backend,
            transformer,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Start a request that uses this generator's configured attempt count.
    pub fn request(
        &self,
        image: Vec<u8>,
        content_type: impl Into<String>,
        prompt: impl Into<String>,
    ) -> GenerationRequest {
        GenerationRequest::new(image, content_type, prompt)
            .with_max_retries(self.config.max_retries)
    }

    /// Post-processing applied to clips for `aspect_ratio`.
    pub fn transform_spec_for(&self, aspect_ratio: AspectRatio) -> TransformSpec {
        if aspect_ratio.is_square() {
            TransformSpec::square(self.config.start_trim_seconds, self.config.square_strategy)
        } else {
            TransformSpec::trim(self.config.start_trim_seconds)
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<VideoResult> {
        request.validate()?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let logger = JobLogger::new(&request_id, "generate_video");
        let span = logger.create_span();
        let started = Instant::now();

        let result = self.run(request, &logger).instrument(span).await;

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(video) => {
                metrics::record_generation("success", elapsed);
                logger.log_completion(&format!(
                    "{} bytes after {} attempt(s) in {:.1}s",
                    video.video_data.len(),
                    video.attempts,
                    elapsed
                ));
            }
            Err(e) => {
                metrics::record_generation(e.error_type(), elapsed);
                logger.log_error(&e.to_string());
            }
        }

        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        logger: &JobLogger,
    ) -> GenerationResult<VideoResult> {
        logger.log_start(&format!(
            "duration={}s aspect_ratio={} max_retries={}",
            request.duration, request.aspect_ratio, request.max_retries
        ));

        let asset = self
            .backend
            .upload(&request.image, &request.content_type)
            .await
            .map(UploadedAsset::new)
            .map_err(|e| GenerationError::upload(e.to_string()))?;
        logger.log_progress(&format!("image uploaded to {}", asset.url()));

        let input = GenerationInput {
            image_url: asset.url().to_string(),
            prompt: request.prompt.clone(),
            duration: request.duration,
            resolution: self.config.resolution,
            aspect_ratio: request.aspect_ratio.for_submission(),
        };

        let (video_url, attempts) = self.attempt_until_done(request, &input, logger).await?;

        let spec = self.transform_spec_for(request.aspect_ratio);
        debug!(?spec, video_url = %video_url, "Post-processing generated clip");

        let transform_started = Instant::now();
        let transformed = self
            .transformer
            .transform(VideoSource::Url(video_url.clone()), &spec)
            .await
            .map_err(|e| GenerationError::Transform {
                message: e.detailed_message(),
                video_url: video_url.clone(),
            })?;
        metrics::record_transform(transform_started.elapsed().as_secs_f64());

        Ok(VideoResult {
            video_data: transformed.data,
            status: "success".to_string(),
            trimmed: spec.start_trim_seconds > 0.0,
            video_url,
            attempts,
            aspect_ratio: request.aspect_ratio,
            width: transformed.info.width,
            height: transformed.info.height,
            duration_secs: transformed.info.duration,
            request_id: logger.request_id().to_string(),
            generated_at: Utc::now(),
        })
    }

    /// Run attempts until one succeeds or the request is out of retries.
    ///
    /// Returns the raw video URL and the number of attempts used.
    async fn attempt_until_done(
        &self,
        request: &GenerationRequest,
        input: &GenerationInput,
        logger: &JobLogger,
    ) -> GenerationResult<(String, u32)> {
        for attempt in 0..request.max_retries {
            if attempt > 0 && request.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(GenerationError::DeadlineExceeded { attempts: attempt });
            }

            logger.log_progress(&format!(
                "attempt {}/{}",
                attempt + 1,
                request.max_retries
            ));

            match self.run_attempt(input).await {
                AttemptOutcome::Success(url) => {
                    metrics::record_attempt("success");
                    return Ok((url, attempt + 1));
                }
                AttemptOutcome::RetryableFailure(classified) => {
                    metrics::record_attempt("content_policy_violation");
                    if attempt + 1 >= request.max_retries {
                        return Err(GenerationError::content_policy(
                            classified.message,
                            request.max_retries,
                        ));
                    }
                    logger.log_warning(&format!(
                        "content policy violation on attempt {}/{}, retrying with the same input: {}",
                        attempt + 1,
                        request.max_retries,
                        classified.message
                    ));
                }
                AttemptOutcome::FatalFailure(e) => {
                    metrics::record_attempt("fatal");
                    return Err(e);
                }
            }
        }

        // validate() guarantees at least one attempt, and every attempt returns
        Err(GenerationError::invalid_request(
            "max_retries must be at least 1",
        ))
    }

    async fn run_attempt(&self, input: &GenerationInput) -> AttemptOutcome {
        let submitted =
            tokio::time::timeout(self.config.submit_timeout, self.backend.generate(input)).await;

        match submitted {
            Err(_) => AttemptOutcome::FatalFailure(GenerationError::video_generation(format!(
                "no result within {}s",
                self.config.submit_timeout.as_secs()
            ))),
            Ok(Ok(output)) => match output.video_url() {
                Some(url) => AttemptOutcome::Success(url.to_string()),
                None => AttemptOutcome::FatalFailure(GenerationError::malformed(
                    "response has no video URL",
                )),
            },
            // A 2xx whose body does not decode is a broken success, not a refusal
            Ok(Err(e @ (FalError::InvalidResponse(_) | FalError::Json(_)))) => {
                AttemptOutcome::FatalFailure(GenerationError::malformed(e.to_string()))
            }
            Ok(Err(e)) => {
                let classified = classify(&e.upstream_message());
                if classified.is_retryable() {
                    AttemptOutcome::RetryableFailure(classified)
                } else {
                    AttemptOutcome::FatalFailure(GenerationError::video_generation(e.to_string()))
                }
            }
        }
    }
}

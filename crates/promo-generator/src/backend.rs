//! Seams between the orchestrator and its external services.

use async_trait::async_trait;
use promo_fal::{FalClient, FalResult, GenerationInput, GenerationOutput};
use promo_media::{MediaResult, TransformEngine, TransformedVideo, VideoSource};
use promo_models::TransformSpec;

/// Image upload and video generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Store the image and return a URL the generator can read it from.
    async fn upload(&self, data: &[u8], content_type: &str) -> FalResult<String>;

    /// Run one generation to completion.
    async fn generate(&self, input: &GenerationInput) -> FalResult<GenerationOutput>;
}

/// Post-processing of a generated clip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoTransformer: Send + Sync {
    async fn transform(
        &self,
        source: VideoSource,
        spec: &TransformSpec,
    ) -> MediaResult<TransformedVideo>;
}

#[async_trait]
impl GenerationBackend for FalClient {
    async fn upload(&self, data: &[u8], content_type: &str) -> FalResult<String> {
        FalClient::upload(self, data, content_type).await
    }

    async fn generate(&self, input: &GenerationInput) -> FalResult<GenerationOutput> {
        self.subscribe(input).await
    }
}

#[async_trait]
impl VideoTransformer for TransformEngine {
    async fn transform(
        &self,
        source: VideoSource,
        spec: &TransformSpec,
    ) -> MediaResult<TransformedVideo> {
        TransformEngine::transform(self, source, spec).await
    }
}

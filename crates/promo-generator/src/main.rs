//! Command-line promo video generator.
//!
//! Reads its inputs from the environment:
//! - `PROMO_IMAGE`: character image, a path or an http(s) URL
//! - `PROMO_PROMPT`: prompt to use as is, or
//! - `PROMO_PAGE_TEXT` or `PROMO_PAGE_TEXT_FILE`: landing-page text to build
//!   the prompt from
//! - `PROMO_PAGE_URL`: page URL, for logging and relative image links
//! - `PROMO_ASPECT_RATIO`, `PROMO_DURATION`: generation parameters
//! - `PROMO_OUTPUT`: output video path (metadata is written next to it)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use promo_analysis::{build_video_prompt, LlmClient, PageAnalyzer, PageContent};
use promo_fal::FalClient;
use promo_media::download::http_client;
use promo_media::{download_bytes, preprocess_image, TransformConfig, TransformEngine, IMAGE_DOWNLOAD_TIMEOUT};
use promo_models::{AspectRatio, ProductInfo, VideoDuration};
use promo_generator::{GenerationError, GeneratorConfig, VideoGenerator};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting promo-generate");

    if let Err(e) = run().await {
        error!("{:#}", e);
        if let Some(generation_error) = e.downcast_ref::<GenerationError>() {
            for suggestion in generation_error.suggestions() {
                warn!("Suggestion: {}", suggestion);
            }
            if let Some(url) = generation_error.video_url() {
                warn!("Unprocessed video is still available at {}", url);
            }
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    let aspect_ratio: AspectRatio = env_or("PROMO_ASPECT_RATIO", "16:9")
        .parse()
        .map_err(GenerationError::from)?;
    let duration: VideoDuration = env_or("PROMO_DURATION", "12")
        .parse()
        .map_err(GenerationError::from)?;
    let output = PathBuf::from(env_or("PROMO_OUTPUT", "promo.mp4"));

    let config = GeneratorConfig::from_env();
    info!("Generator config: {:?}", config);

    let image_ref = std::env::var("PROMO_IMAGE").context("PROMO_IMAGE is not set")?;
    let image = load_image(&image_ref).await?;
    let image = preprocess_image(&image).context("failed to prepare the character image")?;

    let prompt = resolve_prompt(aspect_ratio, duration).await?;

    let backend = FalClient::from_env()?;
    let transformer =
        TransformEngine::new(TransformConfig::default().with_work_dir(&config.work_dir))?;

    let generator = VideoGenerator::new(Arc::new(backend), Arc::new(transformer), config);
    let request = generator
        .request(image, "image/jpeg", prompt)
        .with_duration(duration)
        .with_aspect_ratio(aspect_ratio);

    let result = generator.generate(&request).await?;

    tokio::fs::write(&output, &result.video_data)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    let metadata_path = output.with_extension("json");
    tokio::fs::write(&metadata_path, serde_json::to_vec_pretty(&result)?)
        .await
        .with_context(|| format!("failed to write {}", metadata_path.display()))?;

    info!(
        "Wrote {} ({}x{}, {:.1}s) after {} attempt(s)",
        output.display(),
        result.width,
        result.height,
        result.duration_secs,
        result.attempts
    );
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

async fn load_image(image_ref: &str) -> anyhow::Result<Vec<u8>> {
    if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
        let client = http_client(IMAGE_DOWNLOAD_TIMEOUT)?;
        return Ok(download_bytes(&client, image_ref).await?);
    }
    tokio::fs::read(image_ref)
        .await
        .with_context(|| format!("failed to read {}", image_ref))
}

/// Explicit prompt first, then page analysis, then a placeholder prompt.
async fn resolve_prompt(aspect_ratio: AspectRatio, duration: VideoDuration) -> anyhow::Result<String> {
    if let Ok(prompt) = std::env::var("PROMO_PROMPT") {
        if !prompt.trim().is_empty() {
            return Ok(prompt);
        }
    }

    let text = match (
        std::env::var("PROMO_PAGE_TEXT").ok(),
        std::env::var("PROMO_PAGE_TEXT_FILE").ok(),
    ) {
        (Some(text), _) if !text.trim().is_empty() => Some(text),
        (_, Some(path)) => Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path))?,
        ),
        _ => None,
    };

    if let Some(text) = text {
        let page = PageContent {
            url: std::env::var("PROMO_PAGE_URL").ok(),
            text,
            character_image: None,
        };

        let analyzer = PageAnalyzer::new(LlmClient::from_env()?);
        let analysis = analyzer.analyze(&page, aspect_ratio, duration).await?;
        info!(
            "Extracted {} of 7 copy elements from the page",
            analysis.product.filled_count()
        );
        return Ok(analysis.generated_prompt);
    }

    warn!("No prompt or page text given, using a generic prompt");
    Ok(build_video_prompt(&ProductInfo::default(), aspect_ratio, duration))
}

//! Landing-page analysis: marketing copy and the video prompt built from it.

use promo_models::{AspectRatio, ProductInfo, VideoDuration};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::LlmClient;
use crate::error::{AnalysisError, AnalysisResult};
use crate::parse::parse_analysis;
use crate::prompt::{build_analysis_prompt, build_video_prompt};

/// Text and metadata of a landing page, already fetched.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page URL, used to resolve relative image references
    pub url: Option<String>,
    /// Visible text of the page
    pub text: String,
    /// Character image reference as found on the page, possibly relative
    pub character_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageAnalysis {
    #[serde(flatten)]
    pub product: ProductInfo,
    pub generated_prompt: String,
    pub raw_analysis: String,
    pub page_url: Option<String>,
    /// Absolute URL of the character image, when one could be resolved
    pub character_image_url: Option<String>,
}

/// Turns page text into marketing copy and a generation prompt.
#[derive(Debug, Clone)]
pub struct PageAnalyzer {
    client: LlmClient,
}

impl PageAnalyzer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub async fn analyze(
        &self,
        page: &PageContent,
        aspect_ratio: AspectRatio,
        duration: VideoDuration,
    ) -> AnalysisResult<PageAnalysis> {
        if page.text.trim().is_empty() {
            return Err(AnalysisError::EmptyPageText);
        }

        let raw_analysis = self
            .client
            .invoke_with_retry(&build_analysis_prompt(&page.text))
            .await?;

        let product = parse_analysis(&raw_analysis);
        if product.is_empty() {
            warn!("Analysis contained none of the expected fields");
        }

        let generated_prompt = build_video_prompt(&product, aspect_ratio, duration);
        let character_image_url =
            resolve_character_image(page.url.as_deref(), page.character_image.as_deref());

        info!(
            fields = product.filled_count(),
            has_character_image = character_image_url.is_some(),
            "Page analysis complete"
        );

        Ok(PageAnalysis {
            product,
            generated_prompt,
            raw_analysis,
            page_url: page.url.clone(),
            character_image_url,
        })
    }
}

/// Absolute http(s) URL for a character image reference.
///
/// Failure only drops the image from the analysis.
pub fn resolve_character_image(page_url: Option<&str>, candidate: Option<&str>) -> Option<String> {
    let candidate = candidate.map(str::trim).filter(|c| !c.is_empty())?;

    let resolved = match url::Url::parse(candidate) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => match page_url {
            Some(base) => url::Url::parse(base).and_then(|base| base.join(candidate)),
            None => Err(url::ParseError::RelativeUrlWithoutBase),
        },
        Err(e) => Err(e),
    };

    match resolved {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        Ok(url) => {
            warn!(scheme = url.scheme(), "Ignoring character image with unsupported scheme");
            None
        }
        Err(e) => {
            warn!(candidate = %candidate, error = %e, "Could not resolve character image URL");
            None
        }
    }
}

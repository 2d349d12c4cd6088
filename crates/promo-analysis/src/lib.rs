//! Landing-page analysis for promo video generation.
//!
//! Sends page text to an LLM gateway, parses the seven marketing-copy
//! elements out of the answer and assembles the image-to-video prompt.

pub mod analyzer;
pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod retry;

pub use analyzer::{resolve_character_image, PageAnalysis, PageAnalyzer, PageContent};
pub use client::{extract_response, LlmClient, LlmConfig};
pub use error::{AnalysisError, AnalysisResult};
pub use parse::parse_analysis;
pub use prompt::{build_analysis_prompt, build_video_prompt};
pub use retry::{retry_async, RetryConfig, RetryResult};

//! Analysis error types.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("LLM gateway request timed out after {0} seconds")]
    Timeout(u64),

    #[error("LLM gateway returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected LLM gateway response: {0}")]
    InvalidResponse(String),

    #[error("Page text is empty")]
    EmptyPageText,

    #[error("All {attempts} attempts failed. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

//! fal client error types.

use thiserror::Error;

pub type FalResult<T> = Result<T, FalError>;

#[derive(Debug, Error)]
pub enum FalError {
    #[error("Missing configuration: {0}")]
    Config(String),

    /// Non-success HTTP status. `detail` is the reduced error body.
    #[error("fal API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The request finished on the queue but reported an error.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FalError {
    pub fn api(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            detail: reduce_error_body(body),
        }
    }

    /// Transport-level failures worth repeating the same HTTP call for.
    ///
    /// Rejections of the request itself (4xx other than 429) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FalError::Api { status, .. } => *status == 429 || *status >= 500,
            FalError::Timeout(_) => true,
            FalError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The upstream's own description of the failure, without our framing.
    pub fn upstream_message(&self) -> String {
        match self {
            FalError::Api { detail, .. } => detail.clone(),
            FalError::RequestFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Reduce a fal error body to the text worth classifying.
///
/// `{"detail": [...]}` becomes the JSON text of the array, `{"detail": "..."}`
/// the string. Anything else is passed through trimmed.
pub fn reduce_error_body(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(detail @ serde_json::Value::Array(_)) => detail.to_string(),
            Some(detail @ serde_json::Value::Object(_)) => detail.to_string(),
            _ => trimmed.to_string(),
        },
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_detail_array() {
        let body = r#"{"detail": [{"loc": ["body"], "msg": "blocked", "type": "content_policy_violation"}]}"#;
        let reduced = reduce_error_body(body);
        let parsed: serde_json::Value = serde_json::from_str(&reduced).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed[0]["type"], "content_policy_violation");
        assert_eq!(parsed[0]["msg"], "blocked");
    }

    #[test]
    fn test_reduce_detail_string() {
        assert_eq!(
            reduce_error_body(r#"{"detail": "Invalid API key"}"#),
            "Invalid API key"
        );
    }

    #[test]
    fn test_reduce_passthrough() {
        assert_eq!(reduce_error_body("  upstream exploded \n"), "upstream exploded");
        assert_eq!(reduce_error_body(r#"{"error": "x"}"#), r#"{"error": "x"}"#);
        assert_eq!(reduce_error_body(""), "");
    }

    #[test]
    fn test_retryable() {
        assert!(FalError::api(503, "busy").is_retryable());
        assert!(FalError::api(429, "slow down").is_retryable());
        assert!(!FalError::api(422, "bad").is_retryable());
        assert!(!FalError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_upstream_message() {
        let err = FalError::api(422, r#"{"detail": "nsfw content"}"#);
        assert_eq!(err.upstream_message(), "nsfw content");
        assert_eq!(
            FalError::RequestFailed("boom".into()).upstream_message(),
            "boom"
        );
    }
}

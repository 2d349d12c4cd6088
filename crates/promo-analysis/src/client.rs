//! LLM gateway HTTP client.
//!
//! The gateway is a thin proxy in front of the model: it takes
//! `{"prompt": ..., "model": ...}` and answers with the model text wrapped in
//! one of a few envelope shapes (see [`extract_response`]).

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::retry::{retry_async, RetryConfig};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the LLM gateway client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gateway endpoint
    pub gateway_url: String,
    /// Model name sent with each request
    pub model: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay
    pub retry_base_delay: Duration,
}

impl LlmConfig {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            model: Some(DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> AnalysisResult<Self> {
        let gateway_url = std::env::var("LLM_GATEWAY_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AnalysisError::Config("LLM_GATEWAY_URL is not set".to_string()))?;

        let defaults = Self::new(gateway_url);
        Ok(Self {
            model: match std::env::var("LLM_MODEL") {
                Ok(model) if model.trim().is_empty() => None,
                Ok(model) => Some(model),
                Err(_) => defaults.model.clone(),
            },
            timeout: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("LLM_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            ..defaults
        })
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Client for the LLM gateway.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client.
    pub fn new(config: LlmConfig) -> AnalysisResult<Self> {
        url::Url::parse(&config.gateway_url).map_err(|e| {
            AnalysisError::Config(format!("Invalid gateway URL {}: {}", config.gateway_url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AnalysisError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AnalysisResult<Self> {
        Self::new(LlmConfig::from_env()?)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send one prompt and return the model text.
    pub async fn invoke(&self, prompt: &str) -> AnalysisResult<String> {
        let request = GatewayRequest {
            prompt,
            model: self.config.model.as_deref(),
        };

        debug!(
            model = self.config.model.as_deref().unwrap_or("<gateway default>"),
            prompt_chars = prompt.chars().count(),
            "Calling LLM gateway"
        );

        let response = self
            .http
            .post(&self.config.gateway_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.config.timeout.as_secs())
                } else {
                    AnalysisError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response.json().await?;
        let text = extract_response(&envelope)?;

        debug!(response_chars = text.chars().count(), "LLM response received");
        Ok(text)
    }

    /// [`Self::invoke`] with exponential backoff between attempts.
    pub async fn invoke_with_retry(&self, prompt: &str) -> AnalysisResult<String> {
        let retry = RetryConfig::new("llm_invoke")
            .with_max_retries(self.config.max_retries)
            .with_base_delay(self.config.retry_base_delay);

        let result = retry_async(&retry, move || self.invoke(prompt)).await;
        match result.into_result() {
            Ok(text) => {
                info!("LLM gateway call succeeded");
                Ok(text)
            }
            Err((error, attempts)) if attempts > 1 => Err(AnalysisError::RetriesExhausted {
                attempts,
                last_error: error.to_string(),
            }),
            Err((error, _)) => Err(error),
        }
    }
}

/// Pull the model text out of a gateway envelope.
///
/// Accepted shapes:
/// - `{"body": "<json text>"}` where the decoded body has a `response` string
/// - `{"body": {"response": "..."}}`
/// - `{"response": "..."}`
pub fn extract_response(envelope: &Value) -> AnalysisResult<String> {
    let Some(object) = envelope.as_object() else {
        return Err(AnalysisError::invalid_response(format!(
            "expected a JSON object, got {}",
            json_kind(envelope)
        )));
    };

    if let Some(body) = object.get("body") {
        let decoded;
        let body = match body {
            Value::String(text) => {
                decoded = serde_json::from_str::<Value>(text).map_err(|e| {
                    AnalysisError::invalid_response(format!("body is not valid JSON: {}", e))
                })?;
                &decoded
            }
            other => other,
        };

        return match body.get("response").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(AnalysisError::invalid_response(
                "no 'response' field in gateway body",
            )),
        };
    }

    match object.get("response") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(AnalysisError::invalid_response(format!(
            "'response' is {}, not a string",
            json_kind(other)
        ))),
        None => Err(AnalysisError::invalid_response(
            "neither 'body' nor 'response' present",
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_string_body() {
        let envelope = json!({
            "statusCode": 200,
            "body": "{\"response\": \"Product name: Acme\"}"
        });
        assert_eq!(extract_response(&envelope).unwrap(), "Product name: Acme");
    }

    #[test]
    fn test_extract_object_body() {
        let envelope = json!({"body": {"response": "hello"}});
        assert_eq!(extract_response(&envelope).unwrap(), "hello");
    }

    #[test]
    fn test_extract_direct_response() {
        let envelope = json!({"response": "direct"});
        assert_eq!(extract_response(&envelope).unwrap(), "direct");
    }

    #[test]
    fn test_extract_invalid_shapes() {
        assert!(extract_response(&json!(["response"])).is_err());
        assert!(extract_response(&json!({"result": "x"})).is_err());
        assert!(extract_response(&json!({"body": "not json"})).is_err());
        assert!(extract_response(&json!({"body": {"response": ""}})).is_err());
        assert!(extract_response(&json!({"response": 5})).is_err());
    }

    #[test]
    fn test_request_omits_missing_model() {
        let with_model = serde_json::to_value(GatewayRequest {
            prompt: "p",
            model: Some("gemini-2.5-flash"),
        })
        .unwrap();
        assert_eq!(with_model["model"], "gemini-2.5-flash");

        let without = serde_json::to_value(GatewayRequest {
            prompt: "p",
            model: None,
        })
        .unwrap();
        assert!(without.get("model").is_none());
    }

    #[test]
    fn test_invalid_gateway_url() {
        assert!(matches!(
            LlmClient::new(LlmConfig::new("not a url")),
            Err(AnalysisError::Config(_))
        ));
    }
}

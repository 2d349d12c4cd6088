//! fal storage and queue HTTP client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::FalConfig;
use crate::error::{FalError, FalResult};
use crate::types::{
    extension_for, GenerationInput, GenerationOutput, QueueState, QueueStatus, QueuedRequest,
    UploadInitiateRequest, UploadInitiateResponse,
};

/// Client for the fal.ai storage and queue APIs.
#[derive(Debug, Clone)]
pub struct FalClient {
    http: Client,
    config: FalConfig,
}

impl FalClient {
    /// Create a new client.
    pub fn new(config: FalConfig) -> FalResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(FalError::Config("API key is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(FalError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> FalResult<Self> {
        Self::new(FalConfig::from_env()?)
    }

    pub fn config(&self) -> &FalConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Key {}", self.config.api_key))
    }

    /// Upload a file to fal storage and return its public URL.
    pub async fn upload(&self, data: &[u8], content_type: &str) -> FalResult<String> {
        let initiate_url = format!(
            "{}/storage/upload/initiate?storage_type=fal-cdn-v3",
            self.config.storage_url.trim_end_matches('/')
        );
        let request = UploadInitiateRequest {
            content_type,
            file_name: format!("{}.{}", uuid::Uuid::new_v4(), extension_for(content_type)),
        };

        let initiate_url = initiate_url.as_str();
        let request = &request;
        let initiated: UploadInitiateResponse = self
            .with_retry(|| async move {
                let response = self
                    .authorized(self.http.post(initiate_url))
                    .timeout(self.config.upload_timeout)
                    .json(request)
                    .send()
                    .await?;
                read_json(response).await
            })
            .await?;

        let upload_url = initiated.upload_url.as_str();
        self.with_retry(|| async move {
            let response = self
                .http
                .put(upload_url)
                .timeout(self.config.upload_timeout)
                .header(CONTENT_TYPE, content_type)
                .body(data.to_vec())
                .send()
                .await?;
            check_status(response).await.map(|_| ())
        })
        .await?;

        debug!(bytes = data.len(), url = %initiated.file_url, "Uploaded file to fal storage");
        Ok(initiated.file_url)
    }

    /// Put a generation request on the queue.
    pub async fn submit(&self, input: &GenerationInput) -> FalResult<QueuedRequest> {
        let url = format!(
            "{}/{}",
            self.config.queue_url.trim_end_matches('/'),
            self.config.model
        );

        // Not retried: a repeated POST would enqueue a second paid request
        let response = self.authorized(self.http.post(&url)).json(input).send().await?;
        let queued: QueuedRequest = read_json(response).await?;

        info!(request_id = %queued.request_id, model = %self.config.model, "Submitted generation request");
        Ok(queued)
    }

    /// Current queue status of a request.
    pub async fn status(&self, request: &QueuedRequest) -> FalResult<QueueStatus> {
        self.with_retry(|| async move {
            let response = self
                .authorized(self.http.get(&request.status_url))
                .send()
                .await?;
            read_json(response).await
        })
        .await
    }

    /// Result of a completed request.
    pub async fn result(&self, request: &QueuedRequest) -> FalResult<GenerationOutput> {
        self.with_retry(|| async move {
            let response = self
                .authorized(self.http.get(&request.response_url))
                .send()
                .await?;
            read_json(response).await
        })
        .await
    }

    /// Submit and wait for the result.
    ///
    /// Polls until the request completes; callers bound the total wait.
    pub async fn subscribe(&self, input: &GenerationInput) -> FalResult<GenerationOutput> {
        let queued = self.submit(input).await?;
        let mut last_state = None;

        loop {
            let status = self.status(&queued).await?;

            if last_state != Some(status.status) {
                debug!(
                    request_id = %queued.request_id,
                    state = ?status.status,
                    queue_position = ?status.queue_position,
                    "Generation request state changed"
                );
                last_state = Some(status.status);
            }

            match status.status {
                QueueState::Completed => {
                    if let Some(error) = status.error.filter(|e| !e.trim().is_empty()) {
                        return Err(FalError::RequestFailed(error));
                    }
                    return self.result(&queued).await;
                }
                QueueState::InQueue | QueueState::InProgress => {}
                QueueState::Unknown => {
                    warn!(request_id = %queued.request_id, "Unrecognized queue state, still polling");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> FalResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = FalResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "fal request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn check_status(response: Response) -> FalResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FalError::api(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> FalResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        FalError::InvalidResponse(format!("{} in body: {}", e, truncate(&body, 200)))
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            FalClient::new(FalConfig::new("  ")),
            Err(FalError::Config(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("日本語テキスト", 2), "日本...");
    }
}

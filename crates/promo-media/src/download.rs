//! HTTP download of generated media.

use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Timeout for fetching a generated video.
pub const VIDEO_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for fetching a source image.
pub const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client used for media downloads.
pub fn http_client(timeout: Duration) -> MediaResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MediaError::download_failed(format!("Failed to build HTTP client: {}", e)))
}

fn check_url(url: &str) -> MediaResult<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| MediaError::download_failed(format!("Invalid URL {}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(MediaError::download_failed(format!(
            "Unsupported URL scheme: {}",
            other
        ))),
    }
}

async fn get(client: &reqwest::Client, url: &str) -> MediaResult<reqwest::Response> {
    let parsed = check_url(url)?;

    let response = client.get(parsed).send().await.map_err(|e| {
        if e.is_timeout() {
            MediaError::download_failed(format!("Timed out fetching {}", url))
        } else {
            MediaError::download_failed(format!("Request to {} failed: {}", url, e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::download_failed(format!(
            "HTTP {} fetching {}",
            status.as_u16(),
            url
        )));
    }

    Ok(response)
}

/// Stream `url` into `output_path`.
///
/// Returns the number of bytes written. An empty body is a failure.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    output_path: impl AsRef<Path>,
) -> MediaResult<u64> {
    let output_path = output_path.as_ref();
    let mut response = get(client, url).await?;

    let mut file = tokio::fs::File::create(output_path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| MediaError::download_failed(format!("Reading body of {}: {}", url, e)))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    if written == 0 {
        return Err(MediaError::download_failed(format!(
            "Empty response body from {}",
            url
        )));
    }

    debug!(url = %url, bytes = written, path = ?output_path, "Download complete");
    Ok(written)
}

/// Fetch `url` fully into memory.
pub async fn download_bytes(client: &reqwest::Client, url: &str) -> MediaResult<Vec<u8>> {
    let response = get(client, url).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| MediaError::download_failed(format!("Reading body of {}: {}", url, e)))?;

    if bytes.is_empty() {
        return Err(MediaError::download_failed(format!(
            "Empty response body from {}",
            url
        )));
    }

    Ok(bytes.to_vec())
}

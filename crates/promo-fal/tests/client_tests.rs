//! fal client tests against a mock server.

use std::time::Duration;

use promo_fal::{FalClient, FalConfig, FalError, GenerationInput};
use promo_models::{AspectRatio, Resolution, VideoDuration};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/fal-ai/sora-2/image-to-video";

fn client(server: &MockServer) -> FalClient {
    let config = FalConfig::new("test-key")
        .with_base_urls(server.uri(), server.uri())
        .with_poll_interval(Duration::from_millis(10));
    FalClient::new(config).unwrap()
}

fn input() -> GenerationInput {
    GenerationInput {
        image_url: "https://cdn.example/char.jpg".to_string(),
        prompt: "A friendly mascot waves".to_string(),
        duration: VideoDuration::Twelve,
        resolution: Resolution::Auto,
        aspect_ratio: AspectRatio::Portrait,
    }
}

async fn mount_queue(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("authorization", "Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "req-1",
            "status_url": format!("{}/requests/req-1/status", server.uri()),
            "response_url": format!("{}/requests/req-1", server.uri()),
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_initiates_then_puts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload/initiate"))
        .and(header("authorization", "Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": format!("{}/upload/abc", server.uri()),
            "file_url": "https://v3.fal.media/files/abc.jpg",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload/abc"))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = client(&server)
        .upload(b"\xff\xd8\xff\xe0jpeg", "image/jpeg")
        .await
        .unwrap();

    assert_eq!(url, "https://v3.fal.media/files/abc.jpg");
}

#[tokio::test]
async fn test_upload_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload/initiate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid key"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload(b"data", "image/png")
        .await
        .unwrap_err();

    match err {
        FalError::Api { status, detail } => {
            assert_eq!(status, 401);
            assert_eq!(detail, "Invalid key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_subscribe_polls_until_completed() {
    let server = MockServer::start().await;
    mount_queue(&server).await;

    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_QUEUE", "queue_position": 2})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/requests/req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": {"url": "https://v3.fal.media/files/out.mp4", "content_type": "video/mp4"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = client(&server).subscribe(&input()).await.unwrap();
    assert_eq!(output.video_url(), Some("https://v3.fal.media/files/out.mp4"));
}

#[tokio::test]
async fn test_subscribe_surfaces_policy_detail() {
    let server = MockServer::start().await;
    mount_queue(&server).await;

    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/requests/req-1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"type": "content_policy_violation", "msg": "The content could not be processed"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server).subscribe(&input()).await.unwrap_err();
    assert!(!err.is_retryable());

    let detail: serde_json::Value = serde_json::from_str(&err.upstream_message()).unwrap();
    assert_eq!(detail[0]["type"], "content_policy_violation");
    assert_eq!(detail[0]["msg"], "The content could not be processed");
}

#[tokio::test]
async fn test_completed_with_error_field() {
    let server = MockServer::start().await;
    mount_queue(&server).await;

    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "error": "Internal generation failure"
        })))
        .mount(&server)
        .await;

    let err = client(&server).subscribe(&input()).await.unwrap_err();
    assert!(matches!(err, FalError::RequestFailed(_)));
    assert_eq!(err.upstream_message(), "Internal generation failure");
}

#[tokio::test]
async fn test_missing_video_is_not_an_error_here() {
    let server = MockServer::start().await;
    mount_queue(&server).await;

    Mock::given(method("GET"))
        .and(path("/requests/req-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/requests/req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"video_id": "v1"})))
        .mount(&server)
        .await;

    let output = client(&server).subscribe(&input()).await.unwrap();
    assert!(output.video_url().is_none());
}

#[tokio::test]
async fn test_submit_validation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_string("prompt too long"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).submit(&input()).await.unwrap_err();
    assert!(matches!(err, FalError::Api { status: 422, .. }));
    assert_eq!(err.upstream_message(), "prompt too long");
}

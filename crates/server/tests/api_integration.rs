//! HTTP API integration tests.
//!
//! These drive the real router in-process with mock transcoders behind it.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use common::{MultipartForm, TestFixture};
use formatshift_core::{LimitsConfig, TranscodeError};

fn single(file_name: &str, data: &[u8], target: &str) -> MultipartForm {
    MultipartForm::new()
        .file("file", file_name, data)
        .text("targetFormat", target)
}

// =============================================================================
// Health, config, metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let mut config = formatshift_core::Config::default();
    config.transcoder.delegate_url = Some("http://converter.internal:9000".to_string());
    let fixture = TestFixture::with_config(config);

    let response = fixture.get("/api/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["batch"]["default_concurrency"], 3);
    assert_eq!(response.body["transcoder"]["delegate_configured"], true);
    assert!(response.body["transcoder"].get("delegate_url").is_none());
    assert!(response.body["transcoder"].get("ffmpeg_path").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/health").await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = fixture.get_raw(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .header(header::CONTENT_TYPE)
        .unwrap()
        .starts_with("text/plain"));
    let text = String::from_utf8_lossy(&response.body);
    assert!(text.contains("formatshift_http_requests_total"));
    assert!(text.contains("/api/health"));
}

// =============================================================================
// Single conversion
// =============================================================================

#[tokio::test]
async fn test_convert_single_image() {
    let fixture = TestFixture::new();

    let response = fixture
        .post_multipart("/api/convert", single("photo.png", b"png-bytes", "webp"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), b"png-bytes->webp");
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/webp"));
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"photo_converted.webp\"")
    );
    assert_eq!(fixture.direct.call_count().await, 1);
    assert_eq!(fixture.delegate.call_count().await, 0);
}

#[tokio::test]
async fn test_convert_single_routes_by_strategy() {
    let fixture = TestFixture::new();

    let response = fixture
        .post_multipart("/api/convert", single("clip.mp4", b"video", "mp3"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("audio/mpeg"));
    assert_eq!(fixture.extract.call_count().await, 1);

    let response = fixture
        .post_multipart("/api/convert", single("song.wav", b"audio", "ogg"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(fixture.delegate.call_count().await, 1);
}

#[tokio::test]
async fn test_convert_single_passes_options() {
    let fixture = TestFixture::new();

    let form = single("photo.png", b"png", "JPG").text("options", r#"{"quality": 0.5, "width": 64}"#);
    let response = fixture.post_multipart("/api/convert", form).await;
    assert_eq!(response.status, StatusCode::OK);

    let calls = fixture.direct.recorded_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target_format, "jpg");
    assert_eq!(calls[0].options.quality(), Some(0.5));
    assert_eq!(calls[0].options.width(), Some(64));
}

#[tokio::test]
async fn test_convert_single_missing_fields() {
    let fixture = TestFixture::new();

    let form = MultipartForm::new().text("targetFormat", "png");
    let response = fixture.post_multipart("/api/convert", form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Missing file or target format");

    let form = MultipartForm::new().file("file", "a.png", b"x");
    let response = fixture.post_multipart("/api/convert", form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(fixture.direct.call_count().await, 0);
}

#[tokio::test]
async fn test_convert_single_bad_options() {
    let fixture = TestFixture::new();

    let form = single("a.png", b"x", "webp").text("options", "not json");
    let response = fixture.post_multipart("/api/convert", form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid options"));
}

#[tokio::test]
async fn test_convert_single_file_too_large() {
    let fixture = TestFixture::with_limits(LimitsConfig {
        max_file_size_bytes: 2 * 1024 * 1024,
        ..Default::default()
    });

    let big = vec![0u8; 2 * 1024 * 1024 + 1];
    let response = fixture
        .post_multipart("/api/convert", single("big.png", &big, "webp"))
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["error"], "File exceeds maximum size of 2MB");
    assert_eq!(fixture.direct.call_count().await, 0);
}

#[tokio::test]
async fn test_convert_single_error_statuses() {
    let fixture = TestFixture::new();

    fixture
        .direct
        .set_next_error(TranscodeError::unsupported("xyz"))
        .await;
    let response = fixture
        .post_multipart("/api/convert", single("a.png", b"x", "png"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.json()["error"], "Unsupported target format: xyz");

    fixture
        .direct
        .set_next_error(TranscodeError::invalid_options(
            "100000x100000 exceeds the limit of 100000000 pixels",
        ))
        .await;
    let form = single("a.png", b"x", "png").text("options", r#"{"width": 100000, "height": 100000}"#);
    let response = fixture.post_multipart("/api/convert", form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid conversion options"));

    fixture
        .delegate
        .set_next_error(TranscodeError::Delegate {
            status: 500,
            message: "Internal Server Error".to_string(),
        })
        .await;
    let response = fixture
        .post_multipart("/api/convert", single("doc.pdf", b"x", "png"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json()["error"],
        "Server conversion failed: 500 Internal Server Error"
    );

    fixture.direct.set_always_fail("mock failure").await;
    let response = fixture
        .post_multipart("/api/convert", single("a.png", b"x", "png"))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "mock failure");
}

// =============================================================================
// Batch conversion
// =============================================================================

#[tokio::test]
async fn test_convert_batch_reports_every_file() {
    let fixture = TestFixture::new();
    fixture.extract.set_always_fail("no audio stream").await;

    let form = MultipartForm::new()
        .file("files", "cover.png", b"cover")
        .file("files", "clip.mp4", b"clip")
        .file("files", "song.wav", b"song")
        .text("targetFormat", "mp3")
        .text("concurrency", "2");
    let response = fixture.post_multipart("/api/convert/batch", form).await;
    assert_eq!(response.status, StatusCode::OK);

    let json = response.json();
    assert_eq!(json["summary"]["total"], 3);
    assert_eq!(json["summary"]["succeeded"], 2);
    assert_eq!(json["summary"]["failed"], 1);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["index"], i);
    }

    // image -> audio is not a direct transcode
    assert_eq!(results[0]["strategy"], "server_delegate");
    assert_eq!(results[0]["output_name"], "cover_converted.mp3");

    assert_eq!(results[1]["strategy"], "video_to_audio_extract");
    assert_eq!(results[1]["succeeded"], false);
    assert_eq!(results[1]["error"], "no audio stream");
    assert!(results[1]["payload"].is_null());

    assert_eq!(results[2]["succeeded"], true);
    let payload = STANDARD
        .decode(results[2]["payload"].as_str().unwrap())
        .unwrap();
    assert_eq!(payload, b"song->mp3");
    assert_eq!(results[2]["size_bytes"], payload.len());
}

#[tokio::test]
async fn test_convert_batch_respects_concurrency() {
    let fixture = TestFixture::new();
    fixture
        .direct
        .set_transcode_duration(Duration::from_millis(10))
        .await;

    let mut form = MultipartForm::new();
    for i in 0..6 {
        form = form.file("files", &format!("img-{}.png", i), format!("img-{}", i).as_bytes());
    }
    let form = form.text("targetFormat", "webp").text("concurrency", "2");

    let response = fixture.post_multipart("/api/convert/batch", form).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(fixture.direct.call_count().await, 6);
    assert_eq!(fixture.direct.max_in_flight(), 2);
}

#[tokio::test]
async fn test_convert_batch_rejects_bad_concurrency() {
    let fixture = TestFixture::new();

    for concurrency in ["0", "abc", "99"] {
        let form = MultipartForm::new()
            .file("files", "a.png", b"a")
            .text("targetFormat", "webp")
            .text("concurrency", concurrency);
        let response = fixture.post_multipart("/api/convert/batch", form).await;
        assert_eq!(
            response.status,
            StatusCode::BAD_REQUEST,
            "concurrency {}",
            concurrency
        );
    }

    assert_eq!(fixture.direct.call_count().await, 0);
}

#[tokio::test]
async fn test_convert_batch_too_many_files() {
    let fixture = TestFixture::with_limits(LimitsConfig {
        max_batch_files: 2,
        ..Default::default()
    });

    let form = MultipartForm::new()
        .file("files", "a.png", b"a")
        .file("files", "b.png", b"b")
        .file("files", "c.png", b"c")
        .text("targetFormat", "webp");
    let response = fixture.post_multipart("/api/convert/batch", form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Too many files: 3 (maximum 2)");
    assert_eq!(fixture.direct.call_count().await, 0);
}

#[tokio::test]
async fn test_convert_batch_failure_for_one_source() {
    let fixture = TestFixture::new();
    fixture
        .direct
        .set_failure_for_source(Bytes::from_static(b"broken"), "corrupt header")
        .await;

    let form = MultipartForm::new()
        .file("files", "ok.png", b"ok")
        .file("files", "broken.png", b"broken")
        .text("target_format", "jpg");
    let response = fixture.post_multipart("/api/convert/batch", form).await;
    assert_eq!(response.status, StatusCode::OK);

    let json = response.json();
    assert_eq!(json["results"][0]["succeeded"], true);
    assert_eq!(json["results"][1]["succeeded"], false);
    assert_eq!(json["results"][1]["error"], "corrupt header");
    assert_eq!(json["summary"]["failed"], 1);
}

//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the in-process router with
//! mock transcoders injected, so conversion endpoints can be exercised without
//! ffmpeg or a remote conversion server.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use formatshift_core::{
    testing::{fixtures, MockTranscoder},
    BulkConverter, Config, LimitsConfig,
};
use formatshift_server::{api::create_router, state::AppState};

const BOUNDARY: &str = "formatshift-test-boundary";

/// Test fixture with one mock transcoder per strategy.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new();
///
///     let form = MultipartForm::new()
///         .file("file", "photo.png", b"png-bytes")
///         .text("targetFormat", "webp");
///     let response = fixture.post_multipart("/api/convert", form).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Image to image conversions
    pub direct: MockTranscoder,
    /// Audio extraction from video
    pub extract: MockTranscoder,
    /// Everything else
    pub delegate: MockTranscoder,
}

/// JSON response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Raw response from a test request
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with custom limits.
    pub fn with_limits(limits: LimitsConfig) -> Self {
        Self::with_config(Config {
            limits,
            ..Default::default()
        })
    }

    /// Create a test fixture from a full configuration.
    pub fn with_config(config: Config) -> Self {
        let direct = MockTranscoder::with_name("mock-direct");
        let extract = MockTranscoder::with_name("mock-extract");
        let delegate = MockTranscoder::with_name("mock-delegate");

        let converter = BulkConverter::new(
            fixtures::transcoder_set(&direct, &extract, &delegate),
            config.batch.clone(),
        );
        let state = Arc::new(AppState::new(config, converter));

        Self {
            router: create_router(state),
            direct,
            extract,
            delegate,
        }
    }

    async fn send(&self, request: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        RawResponse {
            status,
            headers,
            body,
        }
    }

    /// Make a GET request and parse the body as JSON.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let raw = self.get_raw(request).await;
        TestResponse {
            status: raw.status,
            body: raw.json(),
        }
    }

    /// Make an arbitrary request and return the raw response.
    pub async fn get_raw(&self, request: Request<Body>) -> RawResponse {
        self.send(request).await
    }

    /// POST a multipart form.
    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> RawResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(form.into_body()))
            .unwrap();
        self.send(request).await
    }
}

enum FormPart {
    File {
        field: String,
        file_name: String,
        data: Vec<u8>,
    },
    Text {
        field: String,
        value: String,
    },
}

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, file_name: &str, data: &[u8]) -> Self {
        self.parts.push(FormPart::File {
            field: field.to_string(),
            file_name: file_name.to_string(),
            data: data.to_vec(),
        });
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.parts.push(FormPart::Text {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    fn into_body(self) -> Vec<u8> {
        let mut body = Vec::new();
        for part in self.parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                FormPart::File {
                    field,
                    file_name,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            field, file_name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                    body.extend_from_slice(&data);
                }
                FormPart::Text { field, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field)
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }
}

//! Transcoder that forwards conversions to a remote formatshift server.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Posts each conversion to `{base_url}/api/convert`.
pub struct HttpDelegateTranscoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDelegateTranscoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TranscodeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/convert", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transcoder for HttpDelegateTranscoder {
    fn name(&self) -> &str {
        "http-delegate"
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        let mut form = Form::new()
            .part("file", Part::stream(source).file_name("input"))
            .text("targetFormat", target_format.to_string());
        if !options.is_empty() {
            form = form.text("options", options.to_json_string());
        }

        debug!(endpoint = %self.endpoint, target = target_format, "Delegating conversion");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(TranscodeError::Delegate {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}

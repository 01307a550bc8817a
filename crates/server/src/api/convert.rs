//! Conversion endpoints.
//!
//! `POST /api/convert` converts one uploaded file and answers with the raw
//! output. `POST /api/convert/batch` runs every uploaded file through the
//! bulk converter and answers with a JSON report carrying base64 payloads.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use formatshift_core::{
    mime_type, BatchSummary, ConversionOptions, ConversionResult, ConversionTask, LimitsConfig,
    TranscodeError,
};

use crate::metrics::UPLOAD_BYTES_TOTAL;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

fn multipart_error(e: MultipartError) -> ApiError {
    api_error(e.status(), e.body_text())
}

/// HTTP status for a failed conversion.
pub fn status_for(error: &TranscodeError) -> StatusCode {
    match error {
        TranscodeError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
        TranscodeError::InvalidOptions { .. } => StatusCode::BAD_REQUEST,
        TranscodeError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TranscodeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        TranscodeError::Delegate { .. } | TranscodeError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// Form parsing
// =============================================================================

struct UploadedFile {
    name: String,
    data: Bytes,
}

#[derive(Default)]
struct ConvertForm {
    files: Vec<UploadedFile>,
    target_format: Option<String>,
    options: Option<String>,
    concurrency: Option<String>,
}

impl ConvertForm {
    fn parse_options(&self) -> Result<ConversionOptions, ApiError> {
        match self.options.as_deref() {
            None => Ok(ConversionOptions::default()),
            Some(json) => ConversionOptions::from_json_str(json)
                .map_err(|e| bad_request(format!("Invalid options: {}", e))),
        }
    }

    fn into_tasks(self, options: &ConversionOptions) -> Result<Vec<ConversionTask>, ApiError> {
        let target = self
            .target_format
            .ok_or_else(|| bad_request("Missing file or target format"))?;
        Ok(self
            .files
            .into_iter()
            .map(|file| ConversionTask::new(file.name, file.data, &target).with_options(options.clone()))
            .collect())
    }
}

fn non_empty(text: String) -> Option<String> {
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

async fn read_form(
    multipart: &mut Multipart,
    limits: &LimitsConfig,
    endpoint: &str,
) -> Result<ConvertForm, ApiError> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" | "files" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() as u64 > limits.max_file_size_bytes {
                    return Err(api_error(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!(
                            "File exceeds maximum size of {}MB",
                            limits.max_file_size_bytes / (1024 * 1024)
                        ),
                    ));
                }
                UPLOAD_BYTES_TOTAL
                    .with_label_values(&[endpoint])
                    .inc_by(data.len() as u64);
                form.files.push(UploadedFile {
                    name: file_name,
                    data,
                });
            }
            "targetFormat" | "target_format" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.target_format = non_empty(text).map(|t| t.to_ascii_lowercase());
            }
            "options" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.options = non_empty(text);
            }
            "concurrency" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.concurrency = non_empty(text);
            }
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

/// Quoted-string safe rendition of a file name for Content-Disposition.
fn attachment_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Single file
// =============================================================================

/// Convert one uploaded file.
///
/// Multipart fields: `file`, `targetFormat`, optional `options` (JSON object).
pub async fn convert_single(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(&mut multipart, state.limits(), "single").await?;

    if form.files.is_empty() || form.target_format.is_none() {
        return Err(bad_request("Missing file or target format"));
    }
    let options = form.parse_options()?;
    let task = form
        .into_tasks(&options)?
        .into_iter()
        .next()
        .ok_or_else(|| bad_request("Missing file or target format"))?;

    let strategy = task.strategy();
    let transcoder = state.converter().transcoders().for_strategy(strategy);
    info!(
        "Converting '{}' to {} via {} ({})",
        task.name,
        task.target_format,
        transcoder.name(),
        strategy.as_str()
    );

    let payload = transcoder
        .transcode(task.source.clone(), &task.target_format, &task.options)
        .await
        .map_err(|e| {
            warn!("Conversion of '{}' failed: {}", task.name, e);
            api_error(status_for(&e), e.to_string())
        })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(&task.output_name())
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type(&task.target_format).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    )
        .into_response())
}

// =============================================================================
// Batch
// =============================================================================

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub output_name: String,
    pub strategy: &'static str,
    pub succeeded: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub size_bytes: usize,
    /// Base64-encoded output, absent on failure.
    pub payload: Option<String>,
}

impl From<ConversionResult> for BatchItem {
    fn from(result: ConversionResult) -> Self {
        let error = result.failure_reason().map(str::to_string);
        let size_bytes = result.payload().map(|p| p.len()).unwrap_or(0);
        Self {
            index: result.index,
            output_name: result.output_name.clone(),
            strategy: result.strategy.as_str(),
            succeeded: result.succeeded(),
            error,
            elapsed_ms: result.elapsed_millis,
            size_bytes,
            payload: result.into_payload().map(|p| STANDARD.encode(p)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub summary: BatchSummary,
    pub results: Vec<BatchItem>,
}

/// Convert every uploaded file with bounded concurrency.
///
/// Multipart fields: repeated `files` (or `file`), `targetFormat`, optional
/// `options` applied to all files, optional `concurrency`.
pub async fn convert_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let limits = state.limits();
    let form = read_form(&mut multipart, limits, "batch").await?;

    if form.files.is_empty() || form.target_format.is_none() {
        return Err(bad_request("Missing file or target format"));
    }
    if form.files.len() > limits.max_batch_files {
        return Err(bad_request(format!(
            "Too many files: {} (maximum {})",
            form.files.len(),
            limits.max_batch_files
        )));
    }

    let concurrency = match form.concurrency.as_deref() {
        None => state.converter().config().default_concurrency,
        Some(text) => text
            .parse::<usize>()
            .map_err(|_| bad_request(format!("Invalid concurrency: {}", text)))?,
    };
    if concurrency > limits.max_batch_concurrency {
        return Err(bad_request(format!(
            "Concurrency {} exceeds maximum of {}",
            concurrency, limits.max_batch_concurrency
        )));
    }

    let options = form.parse_options()?;
    let tasks = form.into_tasks(&options)?;
    info!(
        "Starting batch of {} files with concurrency {}",
        tasks.len(),
        concurrency
    );

    let results = state
        .converter()
        .run_batch(
            tasks,
            |snapshot| {
                debug!(
                    "Batch progress {}/{} (next: '{}')",
                    snapshot.completed_count, snapshot.total_count, snapshot.in_flight_label
                );
            },
            concurrency,
        )
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    let summary = BatchSummary::from_results(&results);
    info!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );

    Ok(Json(BatchResponse {
        summary,
        results: results.into_iter().map(BatchItem::from).collect(),
    }))
}

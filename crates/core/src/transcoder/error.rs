//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a transcoder can fail with.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The target format cannot be produced by this transcoder.
    #[error("Unsupported target format: {format}")]
    Unsupported { format: String },

    /// Options the transcoder cannot honour, such as oversized dimensions.
    #[error("Invalid conversion options: {reason}")]
    InvalidOptions { reason: String },

    /// Input bytes could not be decoded.
    #[error("Failed to decode input: {reason}")]
    Decode { reason: String },

    /// Output could not be encoded.
    #[error("Failed to encode output: {reason}")]
    Encode { reason: String },

    /// External conversion process failed.
    #[error("Conversion failed: {reason}")]
    Process {
        reason: String,
        stderr: Option<String>,
    },

    /// External tool binary not found.
    #[error("Conversion tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Conversion exceeded its deadline.
    #[error("Conversion timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The delegate service answered with an error status.
    #[error("Server conversion failed: {status} {message}")]
    Delegate { status: u16, message: String },

    /// Transport error talking to the delegate service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else, with a caller-supplied message.
    #[error("{reason}")]
    Failed { reason: String },
}

impl TranscodeError {
    /// Creates an unsupported-format error.
    pub fn unsupported(format: impl Into<String>) -> Self {
        Self::Unsupported {
            format: format.into(),
        }
    }

    /// Creates an invalid-options error.
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }

    /// Creates a process failure with optional stderr output.
    pub fn process(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Process {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a generic failure.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same input could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_) | Self::Http(_))
    }
}

use super::{types::Config, ConfigError};

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Batch concurrency is at least 1 and within the limit
/// - Transcoder timeout and image quality are usable
/// - Size limits are non-zero and consistent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Batch validation
    if config.batch.default_concurrency == 0 {
        return Err(invalid("batch.default_concurrency must be at least 1"));
    }
    if config.batch.default_concurrency > config.limits.max_batch_concurrency {
        return Err(invalid(format!(
            "batch.default_concurrency ({}) exceeds limits.max_batch_concurrency ({})",
            config.batch.default_concurrency, config.limits.max_batch_concurrency
        )));
    }

    // Transcoder validation
    if config.transcoder.timeout_secs == 0 {
        return Err(invalid("transcoder.timeout_secs cannot be 0"));
    }
    if !(0.0..=1.0).contains(&config.transcoder.default_image_quality) {
        return Err(invalid(
            "transcoder.default_image_quality must be between 0 and 1",
        ));
    }
    if config.transcoder.max_image_pixels == 0 {
        return Err(invalid("transcoder.max_image_pixels cannot be 0"));
    }
    if let Some(url) = &config.transcoder.delegate_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("transcoder.delegate_url must be an http(s) URL"));
        }
    }

    // Limits validation
    let limits = &config.limits;
    if limits.max_file_size_bytes == 0 {
        return Err(invalid("limits.max_file_size_bytes cannot be 0"));
    }
    if limits.max_batch_files == 0 {
        return Err(invalid("limits.max_batch_files cannot be 0"));
    }
    if limits.max_batch_concurrency == 0 {
        return Err(invalid("limits.max_batch_concurrency cannot be 0"));
    }
    if (limits.max_request_bytes as u64) < limits.max_file_size_bytes {
        return Err(invalid(
            "limits.max_request_bytes must be at least limits.max_file_size_bytes",
        ));
    }

    Ok(())
}

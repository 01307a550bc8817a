pub mod batch;
pub mod config;
pub mod dispatch;
pub mod format;
pub mod metrics;
pub mod testing;
pub mod transcoder;

pub use batch::{
    BatchConfig, BatchError, BatchSummary, BulkConverter, ConversionOutcome, ConversionResult,
    ConversionTask, ProgressSnapshot,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LimitsConfig,
    SanitizedConfig, ServerConfig,
};
pub use dispatch::{resolve, resolve_formats, Strategy};
pub use format::{classify, classify_file_name, mime_type, MediaKind};
pub use transcoder::{
    create_transcoders, ConversionOptions, TranscodeError, Transcoder, TranscoderConfig,
    TranscoderSet,
};

use formatshift_core::{BulkConverter, Config, LimitsConfig, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    converter: BulkConverter,
}

impl AppState {
    pub fn new(config: Config, converter: BulkConverter) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.config.limits
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn converter(&self) -> &BulkConverter {
        &self.converter
    }
}

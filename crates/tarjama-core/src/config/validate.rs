//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.openai.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "providers.openai.model must not be empty".into(),
            ));
        }
        if self.providers.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "providers.gemini.model must not be empty".into(),
            ));
        }
        if self.providers.openai.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "providers.openai.timeout_ms must be > 0 when set".into(),
            ));
        }
        if self.providers.gemini.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "providers.gemini.timeout_ms must be > 0 when set".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.providers.gemini.temperature) {
            return Err(ConfigError::ValidationError(
                "providers.gemini.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "limits.supported_formats must not be empty".into(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        if self.server.session_idle_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "server.session_idle_minutes must be > 0".into(),
            ));
        }
        Ok(())
    }
}

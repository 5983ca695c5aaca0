//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Provider settings, one table per backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// OpenAI Chat Completions settings
    pub openai: OpenAiConfig,

    /// Google Gemini settings
    pub gemini: GeminiConfig,
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Model name
    pub model: String,

    /// Chat Completions endpoint
    pub endpoint: String,

    /// Client timeout in milliseconds; `None` leaves requests unbounded
    pub timeout_ms: Option<u64>,

    /// Retries on rate limits and server errors
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-nano".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_ms: Some(600_000),
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model name
    pub model: String,

    /// Base URL; requests go to `{endpoint}/{model}:generateContent`
    pub endpoint: String,

    /// Sampling temperature. Translation wants deterministic output.
    pub temperature: f32,

    /// Client timeout in milliseconds; `None` leaves requests unbounded
    pub timeout_ms: Option<u64>,

    /// Retries on rate limits and server errors
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-lite".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            temperature: 0.0,
            timeout_ms: None,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of a single image in megabytes
    pub max_file_size_mb: u64,

    /// Extensions accepted by directory discovery
    pub supported_formats: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Web form settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,

    /// Maximum request body for uploads, in megabytes
    pub max_upload_mb: u64,

    /// Minutes a session may sit unused before it is dropped
    pub session_idle_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            max_upload_mb: 50,
            session_idle_minutes: 60,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

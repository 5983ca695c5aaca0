//! Error types for Tarjama.
//!
//! Precondition failures (`SessionError`) abort a whole run before any
//! provider is contacted. Provider failures (`ProviderError`) never abort a
//! run: the batch orchestrator turns them into `Error: ...` result rows.

use crate::provider::Provider;
use thiserror::Error;

/// Top-level error type for Tarjama operations.
#[derive(Error, Debug)]
pub enum TarjamaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A run could not start
    #[error("{0}")]
    Session(#[from] SessionError),

    /// An upload was rejected
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page template failed to render
    #[error("Render error: {0}")]
    Render(#[from] tera::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Missing-input errors, reported before any provider call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The image sequence is empty
    #[error("Please upload at least one image.")]
    NoImages,

    /// The active provider has no credential
    #[error("Please enter your {} API key.", provider.label())]
    MissingCredential { provider: Provider },
}

/// Rejected uploads.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Zero-byte payload
    #[error("{name} is empty")]
    Empty { name: String },

    /// Payload exceeds the configured size limit
    #[error("{name} is too large ({size_mb}MB > {max_mb}MB)")]
    TooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Neither JPEG nor PNG
    #[error("{name} is not a JPEG or PNG image")]
    UnsupportedFormat { name: String },

    /// The file could not be read
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// A failed provider call.
///
/// `status_code` is set when the provider answered with a non-success HTTP
/// status. `transient` marks transport failures (timeouts, refused or
/// dropped connections) that never produced a status. Both drive retry
/// classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    pub status_code: Option<u16>,
    pub transient: bool,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            transient: false,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
            transient: false,
        }
    }

    /// A transport failure worth retrying.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            transient: true,
        }
    }
}

/// Convenience type alias for Tarjama results.
pub type Result<T> = std::result::Result<T, TarjamaError>;

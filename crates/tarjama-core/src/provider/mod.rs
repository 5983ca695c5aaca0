//! Provider abstraction for screenshot translation.
//!
//! Each hosted model sits behind the [`Translator`] trait. [`Provider`] is
//! the closed set of backends the user can pick from; adding a backend means
//! adding a variant here and an adapter module, without touching callers.

pub(crate) mod gemini;
pub(crate) mod openai;
pub mod retry;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::image::UploadedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction sent with every screenshot, verbatim.
pub const TRANSLATION_PROMPT: &str = "translate this chat to arabic as it is preserve it's original structure translate this whole conversation to arabic with nothing extra text.pleaes strcture the response line by line keep each message in a new line.";

/// A provider API key.
///
/// Held in memory for the session only. `Debug` never prints the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whitespace-only keys count as missing.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Credential(<empty>)")
        } else {
            write!(f, "Credential(***)")
        }
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The selectable backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI Chat Completions
    #[default]
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Gemini];

    /// Machine identifier, used in forms, CLI flags and config keys.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Where users obtain a key for this provider.
    pub fn key_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://platform.openai.com/api-keys",
            Provider::Gemini => "https://aistudio.google.com/apikey",
        }
    }

    /// Create the adapter for this provider.
    ///
    /// `model_override` replaces the configured model name when set.
    pub fn build(
        &self,
        config: &ProvidersConfig,
        model_override: Option<&str>,
    ) -> Box<dyn Translator> {
        match self {
            Provider::OpenAi => {
                let mut cfg = config.openai.clone();
                if let Some(model) = model_override {
                    cfg.model = model.to_string();
                }
                Box::new(OpenAiProvider::new(&cfg))
            }
            Provider::Gemini => {
                let mut cfg = config.gemini.clone();
                if let Some(model) = model_override {
                    cfg.model = model.to_string();
                }
                Box::new(GeminiProvider::new(&cfg))
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

/// Trait that all provider adapters implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn Translator>` for dynamic dispatch).
#[async_trait]
pub trait Translator: Send + Sync {
    /// Provider name for logging (e.g., "openai").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Translate one screenshot, returning the model's text verbatim.
    ///
    /// Every failure, including retries exhausted, comes back as `Err`;
    /// implementations must not panic.
    async fn translate(
        &self,
        image: &UploadedImage,
        credential: &Credential,
    ) -> Result<String, ProviderError>;
}

/// Turn a failed `send()` into a provider error that keeps its cause.
///
/// reqwest's top-level message only names the URL, so the source chain is
/// appended. Timeouts and connection failures are marked transient.
pub(crate) fn transport_error(label: &str, error: &reqwest::Error) -> ProviderError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    let mut message = format!("{label} request failed: {kind}");
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }

    if error.is_timeout() || error.is_connect() {
        ProviderError::transient(message)
    } else {
        ProviderError::new(message)
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// Both providers wrap errors as `{"error": {"message": ...}}`; anything else
/// is returned as-is.
pub(crate) fn error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" gemini ".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("claude".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_default_is_openai() {
        assert_eq!(Provider::default(), Provider::OpenAi);
    }

    #[test]
    fn test_provider_serde_uses_ids() {
        let json = serde_json::to_string(&Provider::Gemini).unwrap();
        assert_eq!(json, "\"gemini\"");
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let key = Credential::new("sk-test");
        let debug = format!("{key:?}");
        assert!(!debug.contains("sk-test"));
        assert_eq!(format!("{:?}", Credential::default()), "Credential(<empty>)");
    }

    #[test]
    fn test_whitespace_credential_is_empty() {
        assert!(Credential::new("   ").is_empty());
        assert!(!Credential::new("sk-test").is_empty());
    }

    #[test]
    fn test_build_applies_model_override() {
        let config = ProvidersConfig::default();
        let openai = Provider::OpenAi.build(&config, None);
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.model(), "gpt-4.1-nano");

        let gemini = Provider::Gemini.build(&config, Some("gemini-1.5-flash"));
        assert_eq!(gemini.name(), "gemini");
        assert_eq!(gemini.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_error_detail_extracts_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_detail(body), "Incorrect API key provided");
        assert_eq!(error_detail("upstream exploded\n"), "upstream exploded");
    }
}

//! Shared state for the web form handlers.

use std::sync::Arc;
use std::time::Duration;
use tarjama_core::config::{LimitsConfig, ProvidersConfig};
use tarjama_core::{Provider, SessionStore, Translator};

/// One adapter per provider, built once at startup.
#[derive(Clone)]
pub struct Translators {
    pub openai: Arc<dyn Translator>,
    pub gemini: Arc<dyn Translator>,
}

impl Translators {
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            openai: Arc::from(Provider::OpenAi.build(config, None)),
            gemini: Arc::from(Provider::Gemini.build(config, None)),
        }
    }

    pub fn get(&self, provider: Provider) -> &dyn Translator {
        match provider {
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Gemini => self.gemini.as_ref(),
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
    pub store: SessionStore,
    pub limits: Arc<LimitsConfig>,
    pub translators: Translators,
}

impl ServerState {
    pub fn new(limits: LimitsConfig, translators: Translators, idle_timeout: Duration) -> Self {
        Self {
            store: SessionStore::with_idle_timeout(idle_timeout),
            limits: Arc::new(limits),
            translators,
        }
    }
}

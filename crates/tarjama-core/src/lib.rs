//! Tarjama Core - chat screenshot translation to Arabic.
//!
//! Screenshots are sent one at a time to a hosted multimodal model with a
//! fixed translation prompt; the model's reply is kept verbatim.
//!
//! # Architecture
//!
//! ```text
//! UploadedImage → data URI → Translator (OpenAI | Gemini) → TranslationResult → page
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tarjama_core::{Config, Provider, Session, UploadedImage};
//!
//! #[tokio::main]
//! async fn main() -> tarjama_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut session = Session::new();
//!     session.select_provider(Provider::Gemini);
//!     session.set_credential(Provider::Gemini, "my-key");
//!     session.upload(vec![UploadedImage::from_path("chat.png".as_ref(), &config.limits)?]);
//!
//!     let translator = Provider::Gemini.build(&config.providers, None);
//!     for result in session.translate(translator.as_ref(), |_| {}).await? {
//!         println!("{}", result.text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod image;
pub mod output;
pub mod provider;
pub mod render;
pub mod session;

// Re-exports for convenient access
pub use batch::{Progress, TranslationResult};
pub use config::Config;
pub use error::{ConfigError, ImageError, ProviderError, Result, SessionError, TarjamaError};
pub use image::UploadedImage;
pub use output::{OutputFormat, OutputWriter};
pub use provider::{Credential, Provider, Translator, TRANSLATION_PROMPT};
pub use session::{Banner, Session, SessionStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

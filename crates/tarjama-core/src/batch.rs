//! Batch orchestration: one sequential pass over the uploaded images.
//!
//! Images are translated strictly front to back, one provider call at a
//! time. A provider failure becomes an `Error: ...` row and the batch moves
//! on; only missing input stops a run, and it does so before any call.

use crate::error::SessionError;
use crate::image::UploadedImage;
use crate::provider::{Credential, Provider, Translator};
use serde::{Serialize, Serializer};
use std::time::Instant;

/// Progress after an image has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Images finished so far, including the one just completed
    pub completed: usize,
    /// Images in the batch
    pub total: usize,
}

impl Progress {
    /// Fraction of the batch finished, in `(0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Human-readable status naming the image just processed.
    pub fn status(&self) -> String {
        format!("Processing image {} of {}...", self.completed, self.total)
    }
}

/// One image paired with its translation or the error that replaced it.
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub image: UploadedImage,
    pub outcome: Result<String, String>,
}

impl TranslationResult {
    /// The text shown to the user: the translation, or `Error: <message>`.
    pub fn text(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(message) => format!("Error: {message}"),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Serialize for TranslationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Record<'a> {
            image: &'a str,
            translation: String,
            ok: bool,
        }

        Record {
            image: &self.image.name,
            translation: self.text(),
            ok: self.is_ok(),
        }
        .serialize(serializer)
    }
}

/// Check the run preconditions without side effects.
pub fn check_preconditions(
    images: &[UploadedImage],
    provider: Provider,
    credential: &Credential,
) -> Result<(), SessionError> {
    if images.is_empty() {
        return Err(SessionError::NoImages);
    }
    if credential.is_empty() {
        return Err(SessionError::MissingCredential { provider });
    }
    Ok(())
}

/// Translate every image in order.
///
/// `provider` names the active selection for the credential check; the
/// caller passes the matching adapter as `translator`. `on_progress` is
/// called once per image after it finishes.
pub async fn run<F>(
    images: &[UploadedImage],
    provider: Provider,
    translator: &dyn Translator,
    credential: &Credential,
    mut on_progress: F,
) -> Result<Vec<TranslationResult>, SessionError>
where
    F: FnMut(Progress),
{
    check_preconditions(images, provider, credential)?;

    let total = images.len();
    tracing::info!(
        "Translating {total} image(s) with {} ({})",
        translator.name(),
        translator.model()
    );

    let mut results = Vec::with_capacity(total);
    for (i, image) in images.iter().enumerate() {
        let start = Instant::now();
        let outcome = translator
            .translate(image, credential)
            .await
            .map_err(|e| e.message);

        match &outcome {
            Ok(_) => tracing::info!(
                "Image {}/{total} ({}) translated in {}ms",
                i + 1,
                image.name,
                start.elapsed().as_millis()
            ),
            Err(message) => tracing::warn!(
                "Image {}/{total} ({}) failed: {message}",
                i + 1,
                image.name
            ),
        }

        results.push(TranslationResult {
            image: image.clone(),
            outcome,
        });
        on_progress(Progress {
            completed: i + 1,
            total,
        });
    }

    Ok(results)
}

//! Per-user session state.
//!
//! A [`Session`] is an explicit value handed to every handler. Each setter
//! touches exactly one field: switching provider keeps the uploads and the
//! last results, and a failed precondition keeps the previous results on
//! screen.

use crate::batch::{self, Progress, TranslationResult};
use crate::error::SessionError;
use crate::image::UploadedImage;
use crate::provider::{Credential, Provider, Translator};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Message shown after a successful run.
pub const SUCCESS_BANNER: &str = "All images processed successfully!";

/// A status line for the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Everything one user has entered and produced.
#[derive(Debug, Default)]
pub struct Session {
    provider: Provider,
    openai_key: Credential,
    gemini_key: Credential,
    images: Vec<UploadedImage>,
    results: Vec<TranslationResult>,
    banner: Option<Banner>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn select_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    pub fn credential(&self, provider: Provider) -> &Credential {
        match provider {
            Provider::OpenAi => &self.openai_key,
            Provider::Gemini => &self.gemini_key,
        }
    }

    pub fn active_credential(&self) -> &Credential {
        self.credential(self.provider)
    }

    pub fn set_credential(&mut self, provider: Provider, credential: impl Into<Credential>) {
        let slot = match provider {
            Provider::OpenAi => &mut self.openai_key,
            Provider::Gemini => &mut self.gemini_key,
        };
        *slot = credential.into();
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    /// Replace the uploaded images.
    ///
    /// An empty upload is ignored, so submitting the form without files
    /// keeps the previous selection.
    pub fn upload(&mut self, images: Vec<UploadedImage>) {
        if images.is_empty() {
            return;
        }
        tracing::debug!("Session upload: {} image(s)", images.len());
        self.images = images;
    }

    pub fn results(&self) -> &[TranslationResult] {
        &self.results
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn set_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    /// Drop the banner once it has been shown.
    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Run a batch over the uploaded images with the active provider.
    ///
    /// On success the result list is replaced as a whole. On a precondition
    /// failure the previous results stay and an error banner is set.
    pub async fn translate<F>(
        &mut self,
        translator: &dyn Translator,
        on_progress: F,
    ) -> Result<&[TranslationResult], SessionError>
    where
        F: FnMut(Progress),
    {
        let outcome = batch::run(
            &self.images,
            self.provider,
            translator,
            self.credential(self.provider),
            on_progress,
        )
        .await;

        match outcome {
            Ok(results) => {
                self.results = results;
                self.banner = Some(Banner::Success(SUCCESS_BANNER.to_string()));
                Ok(&self.results)
            }
            Err(e) => {
                tracing::warn!("Translation not started: {e}");
                self.banner = Some(Banner::Error(e.to_string()));
                Err(e)
            }
        }
    }
}

/// Opaque session identifier carried in a cookie.
pub type SessionId = String;

/// How long an untouched session is kept by default.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

impl Entry {
    /// Idle past the timeout and not held by any request.
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_seen) > idle_timeout
            && Arc::strong_count(&self.session) == 1
    }
}

/// Sessions for the web form, keyed by id.
///
/// Each session sits behind its own async mutex, so one user's running batch
/// never blocks another user. Sessions idle for longer than the timeout are
/// dropped, together with their images and credentials, whenever the store
/// is touched.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<std::sync::Mutex<HashMap<SessionId, Entry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(std::sync::Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Generate a fresh 128-bit hex identifier.
    pub fn new_id() -> SessionId {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn sweep(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {evicted} idle session(s)");
        }
        evicted
    }

    /// Look up a session, creating an empty one on first sight.
    ///
    /// Marks the session as used now and evicts idle ones.
    pub fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        let now = Instant::now();
        let mut sessions = self.entries();
        self.sweep(&mut sessions, now);

        let entry = sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::debug!("New session");
            Entry {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        entry.session.clone()
    }

    /// Whether `id` names a live session.
    pub fn contains(&self, id: &str) -> bool {
        self.entries()
            .get(id)
            .is_some_and(|entry| !entry.is_expired(Instant::now(), self.idle_timeout))
    }

    /// Drop every expired session, returning how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self.entries();
        self.sweep(&mut sessions, Instant::now())
    }

    /// Drop a session and everything it holds, credentials included.
    pub fn remove(&self, id: &str) -> bool {
        self.entries().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

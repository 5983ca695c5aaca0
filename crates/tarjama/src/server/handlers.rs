//! Route handlers for the web form.
//!
//! Every mutating route updates the cookie session and answers with a
//! `303 See Other` back to `/`, where the page is rendered.

use axum::extract::{Multipart, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tarjama_core::render;
use tarjama_core::session::SessionId;
use tarjama_core::{Banner, Provider, SessionStore, UploadedImage};

use super::state::ServerState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "tarjama_session";

/// Form field holding uploaded screenshots.
const IMAGES_FIELD: &str = "images";

#[derive(Deserialize)]
pub struct ProviderForm {
    provider: String,
}

#[derive(Deserialize)]
pub struct CredentialForm {
    provider: String,
    #[serde(default)]
    api_key: String,
}

/// Session id from the request cookie, if it names a live session;
/// otherwise a fresh id. The flag is `true` for a fresh id.
fn resolve_session(state: &ServerState, headers: &HeaderMap) -> (SessionId, bool) {
    match session_cookie(headers) {
        Some(id) if state.store.contains(&id) => (id, false),
        _ => (SessionStore::new_id(), true),
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn with_cookie(mut response: Response, id: &str, fresh: bool) -> Response {
    if fresh {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Strict");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

fn back_to_page(id: &str, fresh: bool) -> Response {
    with_cookie(Redirect::to("/").into_response(), id, fresh)
}

pub async fn index(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&state, &headers);
    let session = state.store.get_or_create(&id);
    let mut session = session.lock().await;

    let response = match render::render_page(&session) {
        Ok(page) => {
            session.clear_banner();
            Html(page).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to render page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    };
    with_cookie(response, &id, fresh)
}

pub async fn select_provider(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<ProviderForm>,
) -> Response {
    let (id, fresh) = resolve_session(&state, &headers);
    let session = state.store.get_or_create(&id);
    let mut session = session.lock().await;

    match form.provider.parse::<Provider>() {
        Ok(provider) => session.select_provider(provider),
        Err(e) => session.set_banner(Banner::Error(e)),
    }
    back_to_page(&id, fresh)
}

pub async fn set_credential(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<CredentialForm>,
) -> Response {
    let (id, fresh) = resolve_session(&state, &headers);
    let session = state.store.get_or_create(&id);
    let mut session = session.lock().await;

    match form.provider.parse::<Provider>() {
        Ok(provider) => {
            session.set_credential(provider, form.api_key.trim());
            tracing::debug!("{} key updated", provider.label());
        }
        Err(e) => session.set_banner(Banner::Error(e)),
    }
    back_to_page(&id, fresh)
}

pub async fn upload(
    State(state): State<ServerState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (id, fresh) = resolve_session(&state, &headers);

    let mut images = Vec::new();
    let mut skipped = Vec::new();
    let mut interrupted = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Upload interrupted: {e}");
                interrupted = Some(e.body_text());
                break;
            }
        };
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Upload interrupted while reading {name}: {e}");
                interrupted = Some(e.body_text());
                break;
            }
        };
        // Browsers send one empty part when no file was chosen.
        if name.is_empty() && bytes.is_empty() {
            continue;
        }

        match UploadedImage::from_upload(name, bytes.to_vec(), &state.limits) {
            Ok(image) => images.push(image),
            Err(e) => {
                tracing::warn!("Rejected upload: {e}");
                skipped.push(e.to_string());
            }
        }
    }

    let session = state.store.get_or_create(&id);
    let mut session = session.lock().await;

    // A cut-off request never replaces the previous selection.
    if let Some(reason) = interrupted {
        session.set_banner(Banner::Error(format!(
            "Upload was cut short ({reason}). Your previous images were kept."
        )));
        return back_to_page(&id, fresh);
    }

    session.upload(images);
    if !skipped.is_empty() {
        session.set_banner(Banner::Error(format!(
            "Skipped {} file(s): {}",
            skipped.len(),
            skipped.join("; ")
        )));
    }
    back_to_page(&id, fresh)
}

pub async fn translate(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&state, &headers);
    let session = state.store.get_or_create(&id);
    let mut session = session.lock().await;

    let translator = state.translators.get(session.provider());
    let outcome = session
        .translate(translator, |p| tracing::debug!("{}", p.status()))
        .await;
    if let Ok(results) = outcome {
        let failed = results.iter().filter(|r| !r.is_ok()).count();
        tracing::info!("Batch done: {} image(s), {failed} failed", results.len());
    }
    back_to_page(&id, fresh)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

//! Provider adapters against a local HTTP stub.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tarjama_core::provider::retry::is_retryable;
use tarjama_core::config::{GeminiConfig, LimitsConfig, OpenAiConfig, ProvidersConfig};
use tarjama_core::{
    Credential, Provider, Session, SessionError, UploadedImage, TRANSLATION_PROMPT,
};

type Script = Arc<dyn Fn(usize) -> (StatusCode, Value) + Send + Sync>;

struct Recorded {
    path: String,
    headers: HeaderMap,
    body: Value,
}

#[derive(Clone)]
struct StubState {
    calls: Arc<Mutex<Vec<Recorded>>>,
    script: Script,
}

async fn handle(
    State(state): State<StubState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let index = {
        let mut calls = state.calls.lock().unwrap();
        calls.push(Recorded {
            path: uri.path().to_string(),
            headers,
            body,
        });
        calls.len() - 1
    };
    let (status, response) = (state.script)(index);
    (status, Json(response))
}

/// Start a stub server answering every request with `script(call_index)`.
async fn spawn_stub<F>(script: F) -> (String, Arc<Mutex<Vec<Recorded>>>)
where
    F: Fn(usize) -> (StatusCode, Value) + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        calls: calls.clone(),
        script: Arc::new(script),
    };
    let app = Router::new().fallback(handle).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), calls)
}

fn screenshot(name: &str, tag: u8) -> UploadedImage {
    UploadedImage::from_upload(
        name,
        vec![0xFF, 0xD8, 0xFF, 0xE0, tag],
        &LimitsConfig::default(),
    )
    .unwrap()
}

fn openai_config(base: &str, max_retries: u32) -> ProvidersConfig {
    ProvidersConfig {
        openai: OpenAiConfig {
            endpoint: format!("{base}/v1/chat/completions"),
            max_retries,
            retry_delay_ms: 1,
            ..OpenAiConfig::default()
        },
        ..ProvidersConfig::default()
    }
}

fn gemini_config(base: &str, max_retries: u32) -> ProvidersConfig {
    ProvidersConfig {
        gemini: GeminiConfig {
            endpoint: format!("{base}/v1beta/models"),
            max_retries,
            retry_delay_ms: 1,
            ..GeminiConfig::default()
        },
        ..ProvidersConfig::default()
    }
}

fn openai_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4.1-nano",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
}

#[tokio::test]
async fn openai_sends_prompt_and_image_and_returns_text_verbatim() {
    let (base, calls) =
        spawn_stub(|_| (StatusCode::OK, openai_reply("أحمد: مرحبا\nسارة: أهلا\n"))).await;
    let translator = Provider::OpenAi.build(&openai_config(&base, 0), None);
    let image = screenshot("chat.jpg", 1);

    let text = translator
        .translate(&image, &Credential::new("sk-test"))
        .await
        .unwrap();
    assert_eq!(text, "أحمد: مرحبا\nسارة: أهلا\n");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/v1/chat/completions");
    assert_eq!(calls[0].headers["authorization"], "Bearer sk-test");

    let content = &calls[0].body["messages"][0]["content"];
    assert_eq!(calls[0].body["model"], "gpt-4.1-nano");
    assert_eq!(content[0]["text"], TRANSLATION_PROMPT);
    assert_eq!(content[1]["image_url"]["url"], image.data_uri().as_str());
}

#[tokio::test]
async fn openai_auth_failure_is_an_error_without_retry() {
    let (base, calls) = spawn_stub(|_| {
        (
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Incorrect API key provided: sk-test."}}),
        )
    })
    .await;
    let translator = Provider::OpenAi.build(&openai_config(&base, 2), None);

    let err = translator
        .translate(&screenshot("chat.jpg", 1), &Credential::new("sk-test"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, Some(401));
    assert!(err.message.contains("Incorrect API key"), "got: {}", err.message);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn gemini_retries_server_error_then_succeeds() {
    let (base, calls) = spawn_stub(|i| {
        if i == 0 {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": {"message": "overloaded"}}),
            )
        } else {
            (StatusCode::OK, gemini_reply("مرحبا"))
        }
    })
    .await;
    let translator = Provider::Gemini.build(&gemini_config(&base, 2), None);

    let text = translator
        .translate(&screenshot("chat.png", 2), &Credential::new("g-key"))
        .await
        .unwrap();
    assert_eq!(text, "مرحبا");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].path,
        "/v1beta/models/gemini-2.0-flash-lite:generateContent"
    );
    assert_eq!(calls[1].headers["x-goog-api-key"], "g-key");
    assert_eq!(calls[1].body["generationConfig"]["temperature"], 0.0);
    assert_eq!(calls[1].body["contents"][0]["parts"][0]["text"], TRANSLATION_PROMPT);
    assert_eq!(
        calls[1].body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
        "image/jpeg"
    );
}

#[tokio::test]
async fn gemini_gives_up_after_two_retries() {
    let (base, calls) = spawn_stub(|_| {
        (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "Resource has been exhausted"}}),
        )
    })
    .await;
    let translator = Provider::Gemini.build(&gemini_config(&base, 2), None);

    let err = translator
        .translate(&screenshot("chat.png", 2), &Credential::new("g-key"))
        .await
        .unwrap_err();
    assert!(err.message.contains("Resource has been exhausted"));
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn unreachable_provider_becomes_error_row() {
    // Bind then drop a listener so the port is closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let translator = Provider::OpenAi.build(&openai_config(&base, 0), None);
    let mut session = Session::new();
    session.set_credential(Provider::OpenAi, "sk-test");
    session.upload(vec![screenshot("1.jpg", 1)]);

    let results = session.translate(translator.as_ref(), |_| {}).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]
        .text()
        .starts_with("Error: OpenAI request failed: connection failed"));
}

/// Start a server that accepts connections and never answers.
///
/// Returns the base URL and the number of connections accepted so far.
async fn spawn_silent_server() -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            open.push(socket);
        }
    });
    (format!("http://{addr}"), accepted)
}

#[tokio::test]
async fn closed_port_error_is_transient_and_names_the_cause() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let translator = Provider::OpenAi.build(&openai_config(&base, 2), None);
    let err = translator
        .translate(&screenshot("chat.jpg", 1), &Credential::new("sk-test"))
        .await
        .unwrap_err();

    assert!(err.transient);
    assert!(is_retryable(&err));
    assert!(
        err.message.starts_with("OpenAI request failed: connection failed"),
        "got: {}",
        err.message
    );
}

#[tokio::test]
async fn timeouts_are_retried_and_reported() {
    let (base, accepted) = spawn_silent_server().await;
    let mut config = gemini_config(&base, 2);
    config.gemini.timeout_ms = Some(100);
    let translator = Provider::Gemini.build(&config, None);

    let err = translator
        .translate(&screenshot("chat.png", 2), &Credential::new("g-key"))
        .await
        .unwrap_err();

    assert!(err.transient);
    assert!(
        err.message.starts_with("Gemini request failed: timed out"),
        "got: {}",
        err.message
    );
    // 1 initial + 2 retries, each on a fresh connection
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn two_image_run_with_one_failure() {
    let (base, calls) = spawn_stub(|i| {
        if i == 0 {
            (StatusCode::OK, openai_reply("السطر الأول"))
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": {"message": "The server had an error"}}),
            )
        }
    })
    .await;
    let translator = Provider::OpenAi.build(&openai_config(&base, 0), None);

    let mut session = Session::new();
    session.set_credential(Provider::OpenAi, "sk-test");
    session.upload(vec![screenshot("1.jpg", 1), screenshot("2.jpg", 2)]);

    let mut fractions = Vec::new();
    let results = session
        .translate(translator.as_ref(), |p| fractions.push(p.fraction()))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].image.name, "1.jpg");
    assert_eq!(results[0].text(), "السطر الأول");
    assert_eq!(results[1].image.name, "2.jpg");
    assert!(results[1].text().starts_with("Error:"));
    assert_eq!(fractions, vec![0.5, 1.0]);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_gemini_key_makes_no_calls() {
    let (base, calls) = spawn_stub(|_| (StatusCode::OK, gemini_reply("x"))).await;
    let translator = Provider::Gemini.build(&gemini_config(&base, 2), None);

    let mut session = Session::new();
    session.select_provider(Provider::Gemini);
    session.set_credential(Provider::OpenAi, "sk-test");
    session.upload(vec![screenshot("1.jpg", 1)]);

    let err = session
        .translate(translator.as_ref(), |_| {})
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::MissingCredential {
            provider: Provider::Gemini
        }
    );
    assert!(session.results().is_empty());
    assert!(calls.lock().unwrap().is_empty());
}

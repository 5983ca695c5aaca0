//! Google Gemini provider using the `generateContent` API.
//!
//! The image travels as an `inline_data` part carrying the same base64
//! payload and `image/jpeg` type as the OpenAI data URL.

use super::retry::with_retries;
use super::{error_detail, transport_error, Credential, Translator, TRANSLATION_PROMPT};
use crate::config::GeminiConfig;
use crate::error::ProviderError;
use crate::image::{encode_base64, UploadedImage, REQUEST_MEDIA_TYPE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini provider.
pub struct GeminiProvider {
    model: String,
    endpoint: String,
    temperature: f32,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            timeout: config.timeout_ms.map(Duration::from_millis),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }

    async fn send_once(
        &self,
        body: &GenerateRequest,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        let mut req = self
            .client
            .post(self.url())
            .header("x-goog-api-key", credential.expose())
            .json(body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| transport_error("Gemini", &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::with_status(
                format!("Gemini HTTP {status}: {}", error_detail(&text)),
                status.as_u16(),
            ));
        }

        let generate_resp: GenerateResponse = resp.json().await.map_err(|e| {
            ProviderError::new(format!("Failed to parse Gemini response: {e}"))
        })?;

        generate_resp.into_text()
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl GenerateRequest {
    fn translate(image: &UploadedImage, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: TRANSLATION_PROMPT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: REQUEST_MEDIA_TYPE,
                            data: encode_base64(image.bytes()),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate, untouched.
    fn into_text(self) -> Result<String, ProviderError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (blocked: {r})"))
                .unwrap_or_default();
            return Err(ProviderError::new(format!(
                "Gemini returned no candidates{reason}"
            )));
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if texts.is_empty() {
            return Err(ProviderError::new(
                "Gemini returned a candidate without text content",
            ));
        }
        Ok(texts.concat())
    }
}

#[async_trait]
impl Translator for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(
        &self,
        image: &UploadedImage,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest::translate(image, self.temperature);
        let body = &body;
        with_retries("gemini", self.max_retries, self.retry_delay_ms, move || {
            self.send_once(body, credential)
        })
        .await
    }
}

//! OpenAI provider using the Chat Completions API.
//!
//! Sends the prompt and the image data URL in one user message.

use super::retry::with_retries;
use super::{error_detail, transport_error, Credential, Translator, TRANSLATION_PROMPT};
use crate::config::OpenAiConfig;
use crate::error::ProviderError;
use crate::image::UploadedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    model: String,
    endpoint: String,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            timeout: config.timeout_ms.map(Duration::from_millis),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            client: reqwest::Client::new(),
        }
    }

    async fn send_once(
        &self,
        body: &ChatRequest,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::with_status(
                format!("OpenAI HTTP {status}: {}", error_detail(&text)),
                status.as_u16(),
            ));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(format!("Failed to parse OpenAI response: {e}"))
        })?;

        chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::new("OpenAI returned empty choices array, no content generated")
            })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

impl ChatRequest {
    fn translate(model: &str, image: &UploadedImage) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ChatContent::Text {
                        text: TRANSLATION_PROMPT.to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ],
            }],
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl Translator for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(
        &self,
        image: &UploadedImage,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        let body = ChatRequest::translate(&self.model, image);
        let body = &body;
        with_retries("openai", self.max_retries, self.retry_delay_ms, move || {
            self.send_once(body, credential)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fixtures::jpeg;

    #[test]
    fn test_request_shape() {
        let body = ChatRequest::translate("gpt-4.1-nano", &jpeg("a.jpg"));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4.1-nano");
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");

        let content = messages[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], TRANSLATION_PROMPT);
        assert_eq!(content[1]["type"], "image_url");
        assert!(content[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_parse_keeps_content_verbatim() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  مرحبا\nكيف حالك؟\n"}}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        let text = resp.choices[0].message.content.clone().unwrap();
        assert_eq!(text, "  مرحبا\nكيف حالك؟\n");
    }
}

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The narration service failed or returned nothing usable. Recoverable:
/// the round stays pending and the same prompt may be retried.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("narration service returned no text")]
    EmptyResponse,
}

/// The narration boundary: one prompt string in, narration text out.
/// The engine only ever talks to the service through this trait.
pub trait NarrationClient: Send {
    fn narrate(&self, prompt: &str) -> Result<String, NarrationError>;
}

/// Connection settings for an OpenAI-compatible chat-completions server
/// (LM Studio and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for NarratorSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234".into(),
            model: "local-model".into(),
            temperature: 0.7,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

pub struct ChatCompletionsClient {
    settings: NarratorSettings,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(settings: NarratorSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        )
    }
}

impl NarrationClient for ChatCompletionsClient {
    fn narrate(&self, prompt: &str) -> Result<String, NarrationError> {
        let req = ChatCompletionRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            messages: vec![ChatMessage {
                role: "system".into(),
                content: prompt.to_string(),
            }],
        };

        let resp = self
            .client
            .post(self.completions_url())
            .json(&req)
            .send()?
            .json::<ChatCompletionResponse>()?;

        let text = resp
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(NarrationError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Probe the `/v1/models` endpoint; used by the settings panel.
pub fn test_connection(endpoint: &str) -> Result<String> {
    let client = Client::new();

    let resp: serde_json::Value = client
        .get(format!("{}/v1/models", endpoint.trim_end_matches('/')))
        .send()?
        .json()?;

    Ok(format!(
        "Connected ({} models available)",
        resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
    ))
}

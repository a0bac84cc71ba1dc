use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::constants;

/// Failures of a completion call. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Error from Groq: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Error from Groq: request failed - {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error from Groq: malformed response - {0}")]
    MalformedResponse(String),
}

/// Sends a single prompt to a hosted language model and returns its answer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, credential: &str) -> Result<String, CompletionError>;
}

// Structures matching the OpenAI-compatible /chat/completions endpoint
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatRequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

/// [`CompletionClient`] for Groq's OpenAI-compatible chat completions API.
///
/// One request per call. No retries, no streaming, and no timeout beyond the
/// transport defaults.
pub struct GroqClient {
    client: Client,
    completions_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: Client::new(),
            completions_url: format!("{}/chat/completions", base.trim_end_matches('/')),
            model: model.into(),
        }
    }
}

impl Default for GroqClient {
    fn default() -> Self {
        Self::new(constants::DEFAULT_COMPLETION_URL, constants::DEFAULT_MODEL)
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    #[instrument(skip(self, credential), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, credential: &str) -> Result<String, CompletionError> {
        let request_payload = ChatRequest {
            model: &self.model,
            messages: [ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(credential)
            .json(&request_payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "Failed to read completion error body");
                    String::new()
                }
            };
            error!(status = status.as_u16(), %body, "Completion request failed");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::MalformedResponse("no choices returned".to_string()))?;

        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }
}

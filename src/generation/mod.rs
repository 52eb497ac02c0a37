//! Generative chat backend abstraction and the Mistral adapter.
//!
//! Unlike ranking, generation has no fallback: a silently wrong summary is
//! worse than a visible failure, so every error here propagates to the caller
//! unchanged.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

const DEFAULT_MISTRAL_URL: &str = "https://api.mistral.ai";

/// Errors surfaced while requesting a chat completion.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Backend was unreachable.
    #[error("Generative backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Backend returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Backend response could not be parsed.
    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),
}

/// Role attached to a chat message.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction framing for the conversation.
    System,
    /// Content supplied on behalf of the requester.
    User,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Speaker role.
    pub role: Role,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Parameters for a single chat completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully qualified model identifier understood by the backend.
    pub model: String,
    /// Ordered message sequence forming the prompt.
    pub messages: Vec<ChatMessage>,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature; low values keep output close to deterministic.
    pub temperature: f32,
}

/// Interface implemented by generative chat backends.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Generate a completion for the supplied messages.
    async fn complete(&self, request: CompletionRequest)
    -> Result<String, GenerationClientError>;
}

/// Chat client for the Mistral completions API.
pub struct MistralClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MistralClient {
    /// Construct a client for the API at `base_url` using `api_key`.
    pub fn new(base_url: String, api_key: String) -> Self {
        let http = Client::builder()
            .user_agent("ragsum/generation")
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl GenerativeClient for MistralClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, GenerationClientError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Requesting completion"
        );

        let payload = json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::BackendUnavailable(format!(
                    "failed to reach generative backend at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GenerationClientError::GenerationFailed(
                "generative backend rejected the configured credential".into(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "generative backend returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                GenerationClientError::InvalidResponse("response contained no choices".into())
            })?;

        Ok(choice.message.content)
    }
}

/// Build the generative client described by the loaded configuration.
pub fn get_generative_client() -> Box<dyn GenerativeClient> {
    let config = get_config();
    let base_url = config
        .mistral_url
        .clone()
        .unwrap_or_else(|| DEFAULT_MISTRAL_URL.to_string());
    Box::new(MistralClient::new(
        base_url,
        config.mistral_api_key.clone(),
    ))
}

/// LLM client: the single entry point for chat-completion calls in Linkivo.
///
/// ARCHITECTURAL RULE: No other module may call OpenRouter directly.
/// All LLM interactions go through the `CompletionProvider` trait, which
/// `LlmClient` implements against the OpenAI-compatible OpenRouter API.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Which configured model a call should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Resume rewriting, cover letters and analysis.
    Primary,
    /// Free-text coaching feedback.
    Feedback,
}

/// A single-turn completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub tier: ModelTier,
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    /// A user-only prompt on the primary model at temperature 0.7.
    pub fn primary(prompt: &'a str) -> Self {
        Self {
            tier: ModelTier::Primary,
            system: None,
            prompt,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Seam between the workflow code and the LLM provider.
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice, ignoring blank completions.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenRouter chat-completions client with retry on 429 / 5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    primary_model: String,
    feedback_model: String,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: String,
        primary_model: String,
        feedback_model: String,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            primary_model,
            feedback_model,
        })
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Primary => &self.primary_model,
            ModelTier::Feedback => &self.feedback_model,
        }
    }

    /// Makes a raw call to the chat-completions endpoint, returning the full response.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, request: &CompletionRequest<'_>) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        let body = ChatRequest {
            model: self.model_for(request.tier),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, text);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: text,
                });
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(text),
                });
            }

            let chat: ChatResponse = response.json().await?;

            if let Some(usage) = &chat.usage {
                debug!(
                    "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                    body.model, usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let response = self.call(&request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Pulls `error.message` out of an OpenAI-style error body, or returns the body as-is.
fn parse_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

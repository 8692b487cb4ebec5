//! ============================================================================
//! AI Service Adapter - Embeddings and chat completions over HTTP
//! ============================================================================
//! Typed client for an OpenAI-compatible provider. One attempt per call, no
//! caching, no retries; every failure is classified into the chat error
//! taxonomy and surfaced immediately.
//! ============================================================================

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::error::AssistantError;
use crate::types::{ChatMessage, Role};

/// How many trailing history messages accompany each generation call.
/// Bounds token cost and latency at the price of long-range memory.
pub const HISTORY_WINDOW: usize = 6;

/// Sampling temperature for chat completions.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// Reply length cap for chat completions.
pub const CHAT_MAX_TOKENS: u32 = 500;

/// Embedding and reply generation, as consumed by the resolver and the
/// conversation state machine. `OpenAiClient` is the production
/// implementation; tests substitute fakes.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Map a text to its embedding vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AssistantError>;

    /// Generate a reply to `question`, constrained to `grounding_context`,
    /// with a bounded slice of `history` for conversational continuity.
    async fn generate_reply(
        &self,
        question: &str,
        grounding_context: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError>;
}

/// Client for an OpenAI-compatible embeddings + chat-completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: AiConfig,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Credential check, before any network call is made.
    fn ensure_configured(&self) -> Result<(), AssistantError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AssistantError::NotConfigured)
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        request: &T,
    ) -> Result<(StatusCode, String), AssistantError> {
        let response = self
            .client
            .post(format!("{}/{}", self.config.base_url, path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AssistantError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::network(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl AiService for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AssistantError> {
        self.ensure_configured()?;

        debug!("Requesting embedding for {} chars", text.len());

        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: text.to_string(),
        };

        let (status, body) = self.post_json("embeddings", &request).await?;
        if !status.is_success() {
            return Err(error_from_status(status, &body, "Failed to generate embedding"));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::network(format!("bad embedding response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AssistantError::api("No embedding returned"))
    }

    async fn generate_reply(
        &self,
        question: &str,
        grounding_context: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        self.ensure_configured()?;

        let messages = build_messages(question, grounding_context, history);
        debug!(
            "Requesting chat completion with {} messages ({} history)",
            messages.len(),
            messages.len() - 2
        );

        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };

        let (status, body) = self.post_json("chat/completions", &request).await?;
        if !status.is_success() {
            return Err(error_from_status(status, &body, "Failed to generate response"));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::network(format!("bad chat response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AssistantError::api("No response from API"))
    }
}

/// Assemble the outgoing message sequence: one system message, the last
/// `HISTORY_WINDOW` history messages (oldest of those first), then the new
/// user question. Older history is silently dropped.
fn build_messages(question: &str, grounding_context: &str, history: &[ChatMessage]) -> Vec<ApiMessage> {
    let window_start = history.len().saturating_sub(HISTORY_WINDOW);
    let window = &history[window_start..];

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(ApiMessage {
        role: Role::System,
        content: system_prompt(grounding_context),
    });
    for msg in window {
        messages.push(ApiMessage {
            role: msg.role,
            content: msg.content.clone(),
        });
    }
    messages.push(ApiMessage {
        role: Role::User,
        content: question.to_string(),
    });
    messages
}

/// System instruction for the generation call. With context, the assistant
/// is constrained to answer strictly from it; without, it must state that
/// shop information is unavailable.
fn system_prompt(grounding_context: &str) -> String {
    if grounding_context.is_empty() {
        "You are a helpful customer support assistant. The shop information is not available \
         at the moment. Politely inform the user that you don't have access to the shop's \
         information right now."
            .to_string()
    } else {
        format!(
            "You are a helpful customer support assistant for a local shop. Answer questions \
             based ONLY on the following shop information. If the information is not available \
             in the context, politely say \"I don't have that information\" or suggest \
             contacting the shop directly.\n\nShop Information:\n{}\n\nBe friendly, concise, \
             and helpful. Do not make up information that is not in the shop context.",
            grounding_context
        )
    }
}

/// Classify a non-success HTTP response. 401 means the credential itself is
/// bad, which is a configuration fault, not a retryable API error. Other
/// statuses carry the remote error message through when the body parses.
fn error_from_status(status: StatusCode, body: &str, fallback: &str) -> AssistantError {
    if status == StatusCode::UNAUTHORIZED {
        return AssistantError::NotConfigured;
    }
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| fallback.to_string());
    AssistantError::api(message)
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: Role,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ApiReplyMessage,
}

#[derive(Deserialize)]
struct ApiReplyMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

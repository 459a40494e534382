//! OpenRouter API client with SSE streaming
//!
//! Uses the Chat Completions API with Server-Sent Events and collects the
//! streamed deltas into one answer. `CompletionBackend` is the seam the
//! assistant delegate talks to.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_MODELS_URL: &str = "https://openrouter.ai/api/v1/models";

/// Request timeout in seconds (the delegate applies its own, tighter bound)
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// Max attempts for transient errors
const MAX_RETRIES: u32 = 3;
/// Base delay for exponential backoff (ms)
const RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("stream error: {0}")]
    Stream(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl BackendError {
    /// Network-level failures worth another attempt
    fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport(e) => e.is_timeout() || e.is_connect(),
            BackendError::Status { status, .. } => *status >= 500,
            BackendError::Stream(_) | BackendError::Timeout(_) => false,
        }
    }
}

/// The remote text-completion service: `generate(prompt) -> text`, failable
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Short label for logs
    fn describe(&self) -> String;
}

pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
            max_tokens: Some(1024),
            temperature: Some(0.7),
        }
    }

    /// Streaming request with retry on transient errors
    async fn do_stream(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
                tracing::debug!(attempt, delay_ms = delay, "retrying completion request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.do_stream_attempt(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < MAX_RETRIES => {
                    tracing::warn!(attempt, "transient completion failure: {}", e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single attempt at streaming request
    async fn do_stream_attempt(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let response = self
            .http
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "termfolio")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let mut answer = String::new();
        let mut bytes_stream = response.bytes_stream();

        // Buffer for incomplete SSE lines
        let mut buffer = String::new();

        while let Some(chunk) = bytes_stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline_pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=newline_pos).collect();
                match parse_sse_line(&line) {
                    SseLine::Content(text) => answer.push_str(&text),
                    SseLine::Failure(message) => return Err(BackendError::Stream(message)),
                    SseLine::Done | SseLine::Ignored => {}
                }
            }
        }

        Ok(answer)
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = self.request(prompt);
        self.do_stream(&request).await
    }

    fn describe(&self) -> String {
        format!("openrouter:{}", self.model)
    }
}

/// Check connectivity to OpenRouter
pub async fn check_connectivity() -> Result<(), BackendError> {
    reqwest::Client::new()
        .get(OPENROUTER_MODELS_URL)
        .timeout(Duration::from_secs(5))
        .send()
        .await?;
    Ok(())
}

/// One decoded line of the event stream
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Content(String),
    Failure(String),
    Done,
    Ignored,
}

fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Ignored;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(err) = chunk.error {
                return SseLine::Failure(err.message);
            }
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content)
                .filter(|c| !c.is_empty())
                .map(SseLine::Content)
                .unwrap_or(SseLine::Ignored)
        }
        Err(_) => SseLine::Ignored,
    }
}

// ═══════════════════════════════════════════════════════════════
// API Types
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

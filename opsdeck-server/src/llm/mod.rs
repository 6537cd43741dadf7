//! Language-model collaborator
//!
//! The chat handler only needs "send these messages, get text back". The
//! [`LanguageModel`] trait is that seam; [`OpenAiCompatClient`] is the real
//! implementation and tests substitute their own.

pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::MessageRole;

pub use openai::OpenAiCompatClient;

/// Default OpenAI-compatible endpoint
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default transport timeout for one completion
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One message of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// Completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model id requested by the client
    pub model: String,
    /// Full conversation, oldest first
    pub messages: Vec<LlmMessage>,
}

/// Errors from the model collaborator
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model not configured: {0}")]
    Config(String),

    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Something that can answer a conversation
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the assistant reply for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Connection settings for the OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Overrides the model requested by the client when set
    pub model_override: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model_override: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    /// Build the client, or a stand-in that always fails when no key is set.
    pub fn build(&self) -> Box<dyn LanguageModel> {
        match OpenAiCompatClient::new(self) {
            Ok(client) => Box::new(client),
            Err(e) => {
                tracing::warn!("Chat replies disabled: {}", e);
                Box::new(Unconfigured {
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Model used when no API key is configured
#[derive(Debug)]
pub struct Unconfigured {
    reason: String,
}

#[async_trait]
impl LanguageModel for Unconfigured {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Config(self.reason.clone()))
    }
}

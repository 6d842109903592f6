// src/llm/mod.rs
// Completion gateway interface: one external chat-completions contract,
// wrapped by two operations (chat replies and summaries).

pub mod client;

pub use client::CompletionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role-tagged message in the completion-service wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx reply; status and body are kept for diagnosis
    #[error("completion service returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Stateless wrapper over the external completion service.
///
/// `complete` escalates failures to the caller; `summarize` failures are
/// expected to be degraded locally by the caller so a chat turn is never
/// blocked on a summary.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request a chat reply for [system, priors..., new user message].
    ///
    /// Returns `None` when the service answers 2xx with a payload that parses
    /// but carries no content; the caller substitutes its fallback reply.
    async fn complete(
        &self,
        system_prompt: &str,
        prior_messages: &[Message],
        new_message: &str,
    ) -> Result<Option<String>, CompletionError>;

    /// Request a short cumulative summary of `recent_messages`, merging
    /// `previous_summary` when one exists.
    async fn summarize(
        &self,
        recent_messages: &[Message],
        previous_summary: Option<&str>,
    ) -> Result<String, CompletionError>;
}

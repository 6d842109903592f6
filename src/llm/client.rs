// src/llm/client.rs
// Low-level client for the OpenAI-compatible chat-completions endpoint.
// No wrappers; just reqwest and serde_json.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::LumiConfig;

use super::{CompletionError, CompletionGateway, Message};

const SUMMARIZER_SYSTEM_PROMPT: &str =
    "You are a conversation summarizer. Create concise, contextual summaries.";

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    chat_max_tokens: u32,
    chat_temperature: f32,
    summary_model: String,
    summary_max_tokens: u32,
    summary_temperature: f32,
}

impl CompletionClient {
    /// Build the client from configuration. A missing credential is a fatal
    /// configuration error, reported here rather than silently no-opping on
    /// every request.
    pub fn from_config(config: &LumiConfig) -> Result<Self> {
        if config.completion_api_key.is_empty() {
            return Err(anyhow!(
                "completion API key is not configured (set GROQ_API_KEY)"
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.completion_api_key.clone(),
            base_url: config.completion_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            chat_max_tokens: config.chat_max_tokens,
            chat_temperature: config.chat_temperature,
            summary_model: config.summary_model.clone(),
            summary_max_tokens: config.summary_max_tokens,
            summary_temperature: config.summary_temperature,
        })
    }

    async fn request_completion(
        &self,
        model: &str,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Option<String>, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        Ok(extract_content(&payload))
    }
}

/// Pull the reply text out of a chat-completions payload, if any
fn extract_content(payload: &serde_json::Value) -> Option<String> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
}

/// Build the user-side prompt for a summarization request. When a previous
/// summary exists the model is asked to carry it forward, so compression is
/// cumulative rather than replacing.
fn build_summary_prompt(recent_messages: &[Message], previous_summary: Option<&str>) -> String {
    let transcript = recent_messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    match previous_summary {
        Some(previous) if !previous.is_empty() => format!(
            "Previous conversation summary:\n{previous}\n\n\
Now summarize these recent messages (maintain context from previous summary):\n{transcript}\n\n\
Provide a concise summary in 2-3 sentences capturing key topics, emotional tone, and important details."
        ),
        _ => format!(
            "Summarize this conversation in 2-3 sentences, capturing key topics, \
emotional tone, and important details:\n{transcript}"
        ),
    }
}

#[async_trait]
impl CompletionGateway for CompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        prior_messages: &[Message],
        new_message: &str,
    ) -> Result<Option<String>, CompletionError> {
        let mut messages = Vec::with_capacity(prior_messages.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(prior_messages.iter().cloned());
        messages.push(Message::user(new_message));

        debug!(
            model = %self.chat_model,
            message_count = messages.len(),
            "Requesting chat completion"
        );

        self.request_completion(
            &self.chat_model,
            messages,
            self.chat_max_tokens,
            self.chat_temperature,
        )
        .await
    }

    async fn summarize(
        &self,
        recent_messages: &[Message],
        previous_summary: Option<&str>,
    ) -> Result<String, CompletionError> {
        let messages = vec![
            Message::system(SUMMARIZER_SYSTEM_PROMPT),
            Message::user(build_summary_prompt(recent_messages, previous_summary)),
        ];

        debug!(
            model = %self.summary_model,
            summarized_messages = recent_messages.len(),
            has_previous = previous_summary.is_some(),
            "Requesting summary"
        );

        let content = self
            .request_completion(
                &self.summary_model,
                messages,
                self.summary_max_tokens,
                self.summary_temperature,
            )
            .await?;

        // An empty summary payload is not worth failing the caller over;
        // fall back to what we already had.
        Ok(content
            .or_else(|| previous_summary.map(|s| s.to_string()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_content_reads_first_choice() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello there" } }]
        });
        assert_eq!(extract_content(&payload), Some("hello there".to_string()));
    }

    #[test]
    fn test_extract_content_handles_empty_payloads() {
        assert_eq!(extract_content(&json!({ "choices": [] })), None);
        assert_eq!(extract_content(&json!({})), None);
    }

    #[test]
    fn test_summary_prompt_merges_previous_summary() {
        let recent = vec![Message::user("I adopted a cat"), Message::assistant("Tell me more!")];

        let fresh = build_summary_prompt(&recent, None);
        assert!(fresh.starts_with("Summarize this conversation"));
        assert!(fresh.contains("user: I adopted a cat"));

        let merged = build_summary_prompt(&recent, Some("They talked about pets."));
        assert!(merged.starts_with("Previous conversation summary:"));
        assert!(merged.contains("They talked about pets."));
        assert!(merged.contains("maintain context from previous summary"));
    }

    #[test]
    fn test_from_config_requires_credential() {
        let mut config = LumiConfig::from_env();
        config.completion_api_key = String::new();
        assert!(CompletionClient::from_config(&config).is_err());

        config.completion_api_key = "test-key".to_string();
        assert!(CompletionClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_trims_trailing_slash_off_base_url() {
        let mut config = LumiConfig::from_env();
        config.completion_api_key = "test-key".to_string();
        config.completion_base_url = "https://api.example.com/v1/".to_string();

        let client = CompletionClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }
}

// src/chat/context.rs
// Conversation-context decisions for a single turn: when to fold older
// history into the rolling summary, and which trailing slice of raw
// messages rides along with the request.
//
// The two mechanisms are decoupled on purpose. The window always looks at
// the most recent raw messages regardless of the watermark, while the
// summary is the only representation of anything older than the watermark.

use crate::config::LumiConfig;
use crate::conversation::ChatMessage;

pub const DEFAULT_SUMMARIZE_THRESHOLD: usize = 10;
pub const DEFAULT_WINDOW_MESSAGES: usize = 10;

/// Independent knobs for the summarization trigger and the outbound window.
/// They default to the same value but are never assumed equal.
#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    /// Unsummarized-message count at which a new summary is taken
    pub summarize_threshold: usize,
    /// Maximum raw trailing messages sent with each request
    pub window_messages: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            summarize_threshold: DEFAULT_SUMMARIZE_THRESHOLD,
            window_messages: DEFAULT_WINDOW_MESSAGES,
        }
    }
}

impl ContextConfig {
    pub fn from_config(config: &LumiConfig) -> Self {
        Self {
            summarize_threshold: config.summarize_threshold,
            window_messages: config.context_window_messages,
        }
    }
}

/// Whether this turn should fold the unsummarized tail into the summary.
/// `message_count` is taken before the incoming user message is appended.
pub fn should_summarize(
    message_count: usize,
    last_summarized_at: usize,
    threshold: usize,
) -> bool {
    message_count > 0 && message_count.saturating_sub(last_summarized_at) >= threshold
}

/// The messages the current summary does not yet account for
pub fn unsummarized_tail(messages: &[ChatMessage], last_summarized_at: usize) -> &[ChatMessage] {
    &messages[last_summarized_at.min(messages.len())..]
}

/// The trailing window of raw messages to send with the request
pub fn recent_window(messages: &[ChatMessage], window_messages: usize) -> &[ChatMessage] {
    &messages[messages.len().saturating_sub(window_messages)..]
}

/// The outbound system message: the persona's stored prompt, with the
/// rolling summary appended as a delimited continuity note when present.
pub fn annotated_system_prompt(system_prompt: &str, summary: Option<&str>) -> String {
    match summary {
        Some(summary) if !summary.is_empty() => format!(
            "{system_prompt}\n\nConversation context summary:\n{summary}\n\n\
Use this context to maintain continuity in your responses."
        ),
        _ => system_prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(len: usize) -> Vec<ChatMessage> {
        (0..len).map(|i| ChatMessage::user(format!("m{i}"))).collect()
    }

    #[test]
    fn test_should_summarize_honours_literal_threshold() {
        assert!(!should_summarize(0, 0, 10));
        assert!(!should_summarize(9, 0, 10));
        assert!(should_summarize(10, 0, 10));
        assert!(should_summarize(11, 0, 10));

        // Watermark offsets the count
        assert!(!should_summarize(14, 5, 10));
        assert!(should_summarize(15, 5, 10));
    }

    #[test]
    fn test_should_summarize_never_fires_on_empty_log() {
        assert!(!should_summarize(0, 0, 0));
    }

    #[test]
    fn test_unsummarized_tail_starts_at_watermark() {
        let messages = log(7);
        let tail = unsummarized_tail(&messages, 4);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].content, "m4");

        // Watermark past the end yields an empty slice, not a panic
        assert!(unsummarized_tail(&messages, 12).is_empty());
    }

    #[test]
    fn test_recent_window_is_capped_and_takes_the_tail() {
        let messages = log(25);
        let window = recent_window(&messages, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "m15");
        assert_eq!(window[9].content, "m24");

        assert_eq!(recent_window(&messages[..3], 10).len(), 3);
        assert!(recent_window(&[], 10).is_empty());
    }

    #[test]
    fn test_annotated_prompt_appends_summary_when_present() {
        let plain = annotated_system_prompt("You are Maya.", None);
        assert_eq!(plain, "You are Maya.");

        let empty = annotated_system_prompt("You are Maya.", Some(""));
        assert_eq!(empty, "You are Maya.");

        let annotated = annotated_system_prompt("You are Maya.", Some("They discussed cats."));
        assert!(annotated.starts_with("You are Maya."));
        assert!(annotated.contains("Conversation context summary:\nThey discussed cats."));
        assert!(annotated.contains("maintain continuity"));
    }
}

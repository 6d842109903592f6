// src/chat/service.rs
// One chat turn, end to end: load state, maybe fold history into the
// rolling summary, assemble the outbound context, call the completion
// service, persist the new message pair.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::chat::context::{
    annotated_system_prompt, recent_window, should_summarize, unsummarized_tail, ContextConfig,
};
use crate::conversation::{ChatMessage, Conversation, Role};
use crate::llm::{CompletionError, CompletionGateway, Message};
use crate::storage::Storage;

/// Shown to the user when the service replies 2xx but without content
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble responding right now. Could you try again?";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found")]
    ConversationNotFound,
    #[error("persona not found")]
    PersonaNotFound,
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Result of a successful turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub message: ChatMessage,
    pub conversation: Conversation,
}

#[derive(Clone)]
pub struct ChatService {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn CompletionGateway>,
    context: ContextConfig,
}

impl ChatService {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn CompletionGateway>,
        context: ContextConfig,
    ) -> Self {
        Self {
            storage,
            gateway,
            context,
        }
    }

    /// Run one chat turn for a conversation.
    ///
    /// Concurrent turns on the same conversation are not serialized; two
    /// callers can read the same prior state and race the final write,
    /// last write wins.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<TurnReply, ChatError> {
        let conversation = self
            .storage
            .get_conversation(conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;
        let persona = self
            .storage
            .get_persona(&conversation.persona_id)
            .await?
            .ok_or(ChatError::PersonaNotFound)?;

        // Count before the incoming message is appended; the watermark and
        // the outbound window both work off this pre-turn state.
        let message_count = conversation.messages.len();
        let mut summary = conversation.summary.clone();

        if should_summarize(
            message_count,
            conversation.last_summarized_at,
            self.context.summarize_threshold,
        ) {
            let tail = unsummarized_tail(&conversation.messages, conversation.last_summarized_at);
            info!(
                conversation_id = %conversation_id,
                from = conversation.last_summarized_at,
                to = message_count,
                "Summarizing conversation history"
            );

            match self
                .gateway
                .summarize(&to_wire(tail), summary.as_deref())
                .await
            {
                Ok(new_summary) => {
                    self.storage
                        .update_conversation_summary(conversation_id, &new_summary, message_count)
                        .await?;
                    summary = Some(new_summary);
                }
                // Degrade, don't abort: the turn proceeds on the previous
                // summary and the watermark stays put.
                Err(e) => {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %e,
                        "Summarization failed; keeping previous summary"
                    );
                }
            }
        }

        let window = recent_window(&conversation.messages, self.context.window_messages);
        let system_prompt = annotated_system_prompt(&persona.system_prompt, summary.as_deref());

        let reply = self
            .gateway
            .complete(&system_prompt, &to_wire(window), text)
            .await?
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        let user_message = ChatMessage::user(text);
        let assistant_message = ChatMessage::assistant(reply);

        let mut messages = conversation.messages;
        messages.push(user_message);
        messages.push(assistant_message.clone());

        let updated = self
            .storage
            .update_conversation_messages(conversation_id, messages)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        info!(
            conversation_id = %conversation_id,
            message_count = updated.messages.len(),
            "Chat turn completed"
        );

        Ok(TurnReply {
            message: assistant_message,
            conversation: updated,
        })
    }
}

fn to_wire(messages: &[ChatMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => Message::user(m.content.clone()),
            Role::Assistant => Message::assistant(m.content.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wire_preserves_order_and_roles() {
        let stored = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let wire = to_wire(&stored);
        assert_eq!(wire[0], Message::user("hi"));
        assert_eq!(wire[1], Message::assistant("hello"));
    }
}

// src/storage/mod.rs
// One capability contract over the persona and conversation records, with
// two interchangeable backends selected by configuration: an in-memory map
// for tests and demos, and SQLite for anything that should survive a
// restart. Either way the store is an owned instance injected into the app
// state, never a module-level singleton.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use anyhow::Result;
use async_trait::async_trait;

use crate::conversation::{ChatMessage, Conversation, NewConversation};
use crate::persona::{NewPersona, Persona, PersonaPatch};

#[async_trait]
pub trait Storage: Send + Sync {
    // Personas

    /// Create a persona; the store assigns id and creation time. The system
    /// prompt is composed by the caller and stored as-is.
    async fn create_persona(&self, new: NewPersona, system_prompt: String) -> Result<Persona>;

    async fn get_persona(&self, id: &str) -> Result<Option<Persona>>;

    /// All personas, newest first
    async fn list_personas(&self) -> Result<Vec<Persona>>;

    async fn personas_by_user(&self, user_id: &str) -> Result<Vec<Persona>>;

    /// Partial update; the stored system prompt is never recomputed here
    async fn update_persona(&self, id: &str, patch: PersonaPatch) -> Result<Option<Persona>>;

    // Conversations

    async fn create_conversation(&self, new: NewConversation) -> Result<Conversation>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    /// Conversations for a persona, most recently updated first
    async fn conversations_by_persona(&self, persona_id: &str) -> Result<Vec<Conversation>>;

    /// Replace the full message list (last write wins) and bump `updated_at`
    async fn update_conversation_messages(
        &self,
        id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Option<Conversation>>;

    /// Persist a new rolling summary together with the watermark of how many
    /// messages it accounts for
    async fn update_conversation_summary(
        &self,
        id: &str,
        summary: &str,
        summarized_through: usize,
    ) -> Result<()>;
}

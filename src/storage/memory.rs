// src/storage/memory.rs

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::conversation::{ChatMessage, Conversation, NewConversation};
use crate::persona::{NewPersona, Persona, PersonaPatch};

use super::Storage;

/// In-memory backend. Construct one per process (or per test) and share it
/// behind an `Arc`; nothing here is global.
#[derive(Default)]
pub struct MemoryStorage {
    personas: RwLock<HashMap<String, Persona>>,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_persona(&self, new: NewPersona, system_prompt: String) -> Result<Persona> {
        let persona = Persona {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            name: new.name,
            description: new.description,
            role: new.role,
            traits: new.traits,
            introduction: new.introduction,
            context: new.context,
            instructions: new.instructions,
            example_dialogue: new.example_dialogue,
            icebreakers: new.icebreakers,
            system_prompt,
            created_at: Utc::now(),
        };

        self.personas
            .write()
            .await
            .insert(persona.id.clone(), persona.clone());
        Ok(persona)
    }

    async fn get_persona(&self, id: &str) -> Result<Option<Persona>> {
        Ok(self.personas.read().await.get(id).cloned())
    }

    async fn list_personas(&self) -> Result<Vec<Persona>> {
        let mut personas: Vec<Persona> = self.personas.read().await.values().cloned().collect();
        personas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(personas)
    }

    async fn personas_by_user(&self, user_id: &str) -> Result<Vec<Persona>> {
        let mut personas: Vec<Persona> = self
            .personas
            .read()
            .await
            .values()
            .filter(|p| p.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        personas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(personas)
    }

    async fn update_persona(&self, id: &str, patch: PersonaPatch) -> Result<Option<Persona>> {
        let mut personas = self.personas.write().await;
        let Some(persona) = personas.get_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            persona.name = name;
        }
        if let Some(description) = patch.description {
            persona.description = description;
        }
        if let Some(role) = patch.role {
            persona.role = role;
        }
        if let Some(traits) = patch.traits {
            persona.traits = traits;
        }
        if let Some(introduction) = patch.introduction {
            persona.introduction = introduction;
        }
        if patch.context.is_some() {
            persona.context = patch.context;
        }
        if patch.instructions.is_some() {
            persona.instructions = patch.instructions;
        }
        if patch.example_dialogue.is_some() {
            persona.example_dialogue = patch.example_dialogue;
        }
        if let Some(icebreakers) = patch.icebreakers {
            persona.icebreakers = icebreakers;
        }

        Ok(Some(persona.clone()))
    }

    async fn create_conversation(&self, new: NewConversation) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            persona_id: new.persona_id,
            user_id: new.user_id,
            messages: new.messages,
            summary: None,
            last_summarized_at: 0,
            created_at: now,
            updated_at: now,
        };

        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn conversations_by_persona(&self, persona_id: &str) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| c.persona_id == persona_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn update_conversation_messages(
        &self,
        id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Option<Conversation>> {
        let mut conversations = self.conversations.write().await;
        let Some(conversation) = conversations.get_mut(id) else {
            return Ok(None);
        };

        conversation.messages = messages;
        conversation.updated_at = Utc::now();
        Ok(Some(conversation.clone()))
    }

    async fn update_conversation_summary(
        &self,
        id: &str,
        summary: &str,
        summarized_through: usize,
    ) -> Result<()> {
        let mut conversations = self.conversations.write().await;
        if let Some(conversation) = conversations.get_mut(id) {
            conversation.summary = Some(summary.to_string());
            conversation.last_summarized_at = summarized_through;
            conversation.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_persona() -> NewPersona {
        NewPersona {
            name: "Maya".to_string(),
            description: "A travel photographer".to_string(),
            role: "Companion".to_string(),
            traits: vec!["curious".to_string()],
            introduction: "Hey!".to_string(),
            context: None,
            instructions: None,
            example_dialogue: None,
            icebreakers: vec![],
        }
    }

    #[tokio::test]
    async fn test_persona_round_trip() {
        let store = MemoryStorage::new();
        let created = store
            .create_persona(sample_persona(), "PROMPT".to_string())
            .await
            .unwrap();

        let fetched = store.get_persona(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Maya");
        assert_eq!(fetched.system_prompt, "PROMPT");

        assert!(store.get_persona("missing").await.unwrap().is_none());
        assert_eq!(store.list_personas().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_persona_keeps_system_prompt() {
        let store = MemoryStorage::new();
        let created = store
            .create_persona(sample_persona(), "PROMPT".to_string())
            .await
            .unwrap();

        let patch = PersonaPatch {
            name: Some("Nadia".to_string()),
            ..Default::default()
        };
        let updated = store.update_persona(&created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Nadia");
        assert_eq!(updated.system_prompt, "PROMPT");
    }

    #[tokio::test]
    async fn test_conversation_messages_and_summary() {
        let store = MemoryStorage::new();
        let conversation = store
            .create_conversation(NewConversation {
                persona_id: "p1".to_string(),
                user_id: None,
                messages: vec![],
            })
            .await
            .unwrap();
        assert_eq!(conversation.last_summarized_at, 0);
        assert!(conversation.summary.is_none());

        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let updated = store
            .update_conversation_messages(&conversation.id, messages)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.messages.len(), 2);
        assert!(updated.updated_at >= conversation.updated_at);

        store
            .update_conversation_summary(&conversation.id, "They greeted.", 2)
            .await
            .unwrap();
        let fetched = store.get_conversation(&conversation.id).await.unwrap().unwrap();
        assert_eq!(fetched.summary.as_deref(), Some("They greeted."));
        assert_eq!(fetched.last_summarized_at, 2);
    }

    #[tokio::test]
    async fn test_conversations_filtered_by_persona() {
        let store = MemoryStorage::new();
        for persona_id in ["p1", "p1", "p2"] {
            store
                .create_conversation(NewConversation {
                    persona_id: persona_id.to_string(),
                    user_id: None,
                    messages: vec![],
                })
                .await
                .unwrap();
        }

        assert_eq!(store.conversations_by_persona("p1").await.unwrap().len(), 2);
        assert_eq!(store.conversations_by_persona("p2").await.unwrap().len(), 1);
        assert!(store.conversations_by_persona("p3").await.unwrap().is_empty());
    }
}

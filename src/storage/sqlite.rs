// src/storage/sqlite.rs

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::conversation::{ChatMessage, Conversation, NewConversation};
use crate::persona::{NewPersona, Persona, PersonaPatch};

use super::Storage;

/// SQLite backend. Message logs and the string-list persona fields are kept
/// as JSON text columns; timestamps are RFC 3339 text.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_persona(row: &SqliteRow) -> Result<Persona> {
        let traits: String = row.try_get("traits")?;
        let icebreakers: String = row.try_get("icebreakers")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Persona {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            role: row.try_get("role")?,
            traits: serde_json::from_str(&traits)?,
            introduction: row.try_get("introduction")?,
            context: row.try_get("context")?,
            instructions: row.try_get("instructions")?,
            example_dialogue: row.try_get("example_dialogue")?,
            icebreakers: serde_json::from_str(&icebreakers)?,
            system_prompt: row.try_get("system_prompt")?,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    fn row_to_conversation(row: &SqliteRow) -> Result<Conversation> {
        let messages: String = row.try_get("messages")?;
        let last_summarized_at: i64 = row.try_get("last_summarized_at")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Conversation {
            id: row.try_get("id")?,
            persona_id: row.try_get("persona_id")?,
            user_id: row.try_get("user_id")?,
            messages: serde_json::from_str(&messages)?,
            summary: row.try_get("summary")?,
            last_summarized_at: last_summarized_at.max(0) as usize,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

#[async_trait]
impl Storage for SqliteStorage {
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

        sqlx::query(
            r#"
            INSERT INTO personas (
                id, user_id, name, description, role, traits, introduction,
                context, instructions, example_dialogue, icebreakers,
                system_prompt, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&persona.id)
        .bind(&persona.user_id)
        .bind(&persona.name)
        .bind(&persona.description)
        .bind(&persona.role)
        .bind(serde_json::to_string(&persona.traits)?)
        .bind(&persona.introduction)
        .bind(&persona.context)
        .bind(&persona.instructions)
        .bind(&persona.example_dialogue)
        .bind(serde_json::to_string(&persona.icebreakers)?)
        .bind(&persona.system_prompt)
        .bind(persona.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(persona)
    }

    async fn get_persona(&self, id: &str) -> Result<Option<Persona>> {
        let row = sqlx::query("SELECT * FROM personas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_persona(&r)).transpose()
    }

    async fn list_personas(&self) -> Result<Vec<Persona>> {
        let rows = sqlx::query("SELECT * FROM personas ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_persona).collect()
    }

    async fn personas_by_user(&self, user_id: &str) -> Result<Vec<Persona>> {
        let rows =
            sqlx::query("SELECT * FROM personas WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_persona).collect()
    }

    async fn update_persona(&self, id: &str, patch: PersonaPatch) -> Result<Option<Persona>> {
        let Some(mut persona) = self.get_persona(id).await? else {
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

        sqlx::query(
            r#"
            UPDATE personas
            SET name = ?, description = ?, role = ?, traits = ?, introduction = ?,
                context = ?, instructions = ?, example_dialogue = ?, icebreakers = ?
            WHERE id = ?
            "#,
        )
        .bind(&persona.name)
        .bind(&persona.description)
        .bind(&persona.role)
        .bind(serde_json::to_string(&persona.traits)?)
        .bind(&persona.introduction)
        .bind(&persona.context)
        .bind(&persona.instructions)
        .bind(&persona.example_dialogue)
        .bind(serde_json::to_string(&persona.icebreakers)?)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(persona))
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

        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, persona_id, user_id, messages, summary, last_summarized_at,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, NULL, 0, ?, ?)
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.persona_id)
        .bind(&conversation.user_id)
        .bind(serde_json::to_string(&conversation.messages)?)
        .bind(conversation.created_at.to_rfc3339())
        .bind(conversation.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_conversation(&r)).transpose()
    }

    async fn conversations_by_persona(&self, persona_id: &str) -> Result<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE persona_id = ? ORDER BY updated_at DESC",
        )
        .bind(persona_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_conversation).collect()
    }

    async fn update_conversation_messages(
        &self,
        id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Option<Conversation>> {
        let result = sqlx::query(
            "UPDATE conversations SET messages = ?, updated_at = ? WHERE id = ?",
        )
        .bind(serde_json::to_string(&messages)?)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_conversation(id).await
    }

    async fn update_conversation_summary(
        &self,
        id: &str,
        summary: &str,
        summarized_through: usize,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET summary = ?, last_summarized_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(summary)
        .bind(summarized_through as i64)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

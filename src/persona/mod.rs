// src/persona/mod.rs
// Persona records and the creation payload. The derived system prompt is
// computed once at creation (see prompt.rs) and stored immutably.

pub mod prompt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
    pub role: String,
    pub traits: Vec<String>,
    pub introduction: String,
    pub context: Option<String>,
    pub instructions: Option<String>,
    pub example_dialogue: Option<String>,
    pub icebreakers: Vec<String>,
    /// Derived at creation from the fields above; never recomputed on read
    pub system_prompt: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload: everything except identifier, owner, timestamps and the
/// derived system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersona {
    pub name: String,
    pub description: String,
    pub role: String,
    pub traits: Vec<String>,
    pub introduction: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub example_dialogue: Option<String>,
    pub icebreakers: Vec<String>,
}

impl NewPersona {
    /// Reject payloads whose required text fields are blank. Shape errors are
    /// already caught by deserialization; this covers the empty-string cases
    /// serde lets through.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("role", &self.role),
            ("introduction", &self.introduction),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        Ok(())
    }
}

/// Partial update at the storage boundary. No HTTP route drives this; the
/// record is read-only after creation as far as the API is concerned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub traits: Option<Vec<String>>,
    pub introduction: Option<String>,
    pub context: Option<String>,
    pub instructions: Option<String>,
    pub example_dialogue: Option<String>,
    pub icebreakers: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPersona {
        NewPersona {
            name: "Maya".to_string(),
            description: "A travel photographer with endless stories".to_string(),
            role: "Adventurous companion".to_string(),
            traits: vec!["curious".to_string(), "playful".to_string()],
            introduction: "Hey! Just got back from Lisbon, you won't believe it.".to_string(),
            context: None,
            instructions: None,
            example_dialogue: None,
            icebreakers: vec!["Where would you travel next?".to_string()],
        }
    }

    #[test]
    fn test_validate_accepts_complete_payload() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_required_field() {
        let mut new = sample();
        new.role = "   ".to_string();
        let err = new.validate().unwrap_err();
        assert!(err.contains("role"));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("exampleDialogue").is_some());
        assert!(json.get("example_dialogue").is_none());
    }
}

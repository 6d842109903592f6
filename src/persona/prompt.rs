// src/persona/prompt.rs
// Renders persona attributes into the stored system prompt. Pure string
// assembly: no I/O, no randomness, optional fields fall back to fixed
// defaults so every input produces a prompt.

use super::NewPersona;

const DEFAULT_CONTEXT: &str = "General companion conversation";
const DEFAULT_INSTRUCTIONS: &str = "Be warm and engaging while staying in character";
const DEFAULT_EXAMPLE_DIALOGUE: &str = "User: Hi!\nAI: Hey! So good to see you, what's on your mind?";

/// Compose the system prompt for a persona. Deterministic: identical input
/// always yields an identical string.
pub fn compose_system_prompt(persona: &NewPersona) -> String {
    let context = persona.context.as_deref().unwrap_or(DEFAULT_CONTEXT);
    let instructions = persona
        .instructions
        .as_deref()
        .unwrap_or(DEFAULT_INSTRUCTIONS);
    let example_dialogue = persona
        .example_dialogue
        .as_deref()
        .unwrap_or(DEFAULT_EXAMPLE_DIALOGUE);

    format!(
        "You are {name}, a personality-driven AI companion built for engaging, \
personal conversations.\n\n\
Core identity:\n\
What makes you unique: {description}\n\
Your role: {role} - approach every conversation from this identity.\n\
Personality traits: {traits} - these traits shape how you respond.\n\n\
Communication style:\n\
Introduction style: {introduction}\n\
Context awareness: {context}\n\n\
Conversation management:\n\
Icebreaker topics: {icebreakers}\n\
Special instructions: {instructions}\n\
Communication examples: {example_dialogue}\n\n\
Stay in character as {name} at all times. Keep replies conversational and \
natural, typically one to three sentences, and let your personality traits \
come through in every response.",
        name = persona.name,
        description = persona.description,
        role = persona.role,
        traits = persona.traits.join(", "),
        introduction = persona.introduction,
        context = context,
        icebreakers = persona.icebreakers.join(" \u{2022} "),
        instructions = instructions,
        example_dialogue = example_dialogue,
    )
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
            introduction: "Hey! Just got back from Lisbon.".to_string(),
            context: Some("Travel smalltalk".to_string()),
            instructions: Some("Drop in photography trivia".to_string()),
            example_dialogue: Some("User: Hi\nAI: Hello from the road!".to_string()),
            icebreakers: vec![
                "Where would you travel next?".to_string(),
                "Film or digital?".to_string(),
            ],
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let persona = sample();
        assert_eq!(
            compose_system_prompt(&persona),
            compose_system_prompt(&persona)
        );
    }

    #[test]
    fn test_prompt_embeds_all_fields() {
        let prompt = compose_system_prompt(&sample());
        assert!(prompt.contains("Maya"));
        assert!(prompt.contains("curious, playful"));
        assert!(prompt.contains("Travel smalltalk"));
        assert!(prompt.contains("Where would you travel next? \u{2022} Film or digital?"));
        assert!(prompt.contains("Drop in photography trivia"));
    }

    #[test]
    fn test_optional_fields_fall_back_to_defaults() {
        let mut persona = sample();
        persona.context = None;
        persona.instructions = None;
        persona.example_dialogue = None;

        let prompt = compose_system_prompt(&persona);
        assert!(prompt.contains(DEFAULT_CONTEXT));
        assert!(prompt.contains(DEFAULT_INSTRUCTIONS));
        assert!(prompt.contains(DEFAULT_EXAMPLE_DIALOGUE));
    }
}

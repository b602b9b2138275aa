use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// Flattens a chat transcript into a single completion prompt.
///
/// System messages become a leading preamble, the remaining turns are
/// rendered as `Role: content` lines, and the prompt ends with an open
/// assistant turn.
pub fn render_transcript(messages: &[Message]) -> String {
    let preamble = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.trim())
        .collect::<Vec<_>>()
        .join("\n");

    let turns = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| format!("{}: {}", m.role.as_str(), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    if preamble.is_empty() {
        format!("{turns}\nAssistant:")
    } else {
        format!("{preamble}\n\n{turns}\nAssistant:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript_with_system() {
        let messages = vec![
            Message::new(MessageRole::System, "Be brief."),
            Message::new(MessageRole::User, "Hi"),
            Message::new(MessageRole::Assistant, "Hello!"),
            Message::new(MessageRole::User, "Any laptops?"),
        ];

        assert_eq!(
            render_transcript(&messages),
            "Be brief.\n\nUser: Hi\nAssistant: Hello!\nUser: Any laptops?\nAssistant:"
        );
    }

    #[test]
    fn test_render_transcript_without_system() {
        let messages = vec![Message::new(MessageRole::User, "Hi")];
        assert_eq!(render_transcript(&messages), "User: Hi\nAssistant:");
    }

    #[test]
    fn test_role_deserializes_lowercase() {
        let message: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
    }
}

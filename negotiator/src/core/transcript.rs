//! Role-tagged conversation transcript sent to the model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation, except that a speculative user turn can be
/// withdrawn when the model call it was sent with fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Start a transcript holding only the persona instruction.
    pub fn new(persona_instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(persona_instruction)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Remove the trailing user turn, if the transcript ends with one.
    ///
    /// Returns the withdrawn message. Never removes assistant or system messages.
    pub fn withdraw_user_turn(&mut self) -> Option<ChatMessage> {
        match self.messages.last() {
            Some(message) if message.role == Role::User => self.messages.pop(),
            _ => None,
        }
    }

    /// The last `count` messages rendered as `ROLE: content`, oldest first,
    /// separated by blank lines.
    pub fn render_recent(&self, count: usize) -> String {
        let start = self.messages.len().saturating_sub(count);
        self.messages[start..]
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_holds_only_persona() {
        let transcript = Transcript::new("persona");
        assert_eq!(transcript.messages(), &[ChatMessage::system("persona")]);
    }

    #[test]
    fn withdraw_removes_only_trailing_user_turn() {
        let mut transcript = Transcript::new("persona");
        transcript.push_user("hello");
        assert_eq!(
            transcript.withdraw_user_turn(),
            Some(ChatMessage::user("hello"))
        );
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.withdraw_user_turn(), None);

        transcript.push_user("hi");
        transcript.push_assistant("reply");
        assert_eq!(transcript.withdraw_user_turn(), None);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn render_recent_keeps_order_and_window() {
        let mut transcript = Transcript::new("persona");
        transcript.push_user("one");
        transcript.push_assistant("two");
        transcript.push_user("three");

        assert_eq!(transcript.render_recent(2), "ASSISTANT: two\n\nUSER: three");
        assert!(transcript.render_recent(10).starts_with("SYSTEM: persona"));
    }
}

//! Conversation module - the append-only dialogue state of one extraction

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Ordered sequence of turns exchanged with a language model
///
/// By convention the first message is the system turn and user/assistant
/// turns follow it; the runner that builds the conversation is responsible
/// for keeping that order; it is not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a turn, builder style
    pub fn with(mut self, message: Message) -> Self {
        self.push(message);
        self
    }

    /// All turns in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no turns yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_push_preserves_order() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push(Message::system("sys"));
        conversation.push(Message::user("question"));
        conversation.push(Message::assistant("answer"));

        let roles: Vec<Role> = conversation.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[2].content(), "answer");
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let conversation = Conversation::new()
            .with(Message::system("s"))
            .with(Message::user("u"));
        let json = serde_json::to_string(&conversation).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"system","content":"s"},{"role":"user","content":"u"}]"#
        );
    }
}

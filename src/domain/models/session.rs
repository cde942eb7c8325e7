use std::fmt;

use uuid::Uuid;

use super::Message;

/// Opaque identifier of a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random identifier. Uniqueness rests on UUID v4 randomness alone.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact display.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// In-memory view of one conversation.
///
/// Messages are kept in append order, which is also display order. The
/// session owns the position counter used to key persisted messages: it is
/// seeded from the loaded history and only moves forward, so a position is
/// never handed out twice within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    id: SessionId,
    messages: Vec<Message>,
    next_position: u64,
    /// Context token returned by the recommendation endpoint.
    conversation_id: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            next_position: 0,
            conversation_id: None,
        }
    }

    /// Rebuilds a session from its persisted history.
    pub fn from_history(id: SessionId, messages: Vec<Message>) -> Self {
        let next_position = messages.len() as u64;
        Self {
            id,
            messages,
            next_position,
            conversation_id: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn next_position(&self) -> u64 {
        self.next_position
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn set_conversation_id(&mut self, conversation_id: Option<String>) {
        self.conversation_id = conversation_id;
    }

    /// Appends a message and returns the position it was assigned.
    pub fn push(&mut self, message: Message) -> u64 {
        let position = self.next_position;
        self.messages.push(message);
        self.next_position += 1;
        position
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

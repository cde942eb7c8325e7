use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::invalid_input(format!(
                "Unknown message role '{}'",
                other
            ))),
        }
    }
}

/// A single chat turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    /// Assigned by the session store when the message is written.
    timestamp: Option<i64>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(role: Role, content: String, timestamp: Option<i64>) -> Self {
        Self {
            role,
            content,
            timestamp,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Document key of the message stored at `position` within a session.
pub fn message_key(position: u64) -> String {
    format!("message_{}", position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("Assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = "system".parse::<Role>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_new_message_has_no_timestamp() {
        let message = Message::user("some jazz please");
        assert!(message.is_user());
        assert_eq!(message.content(), "some jazz please");
        assert_eq!(message.timestamp(), None);
    }

    #[test]
    fn test_message_key_uses_zero_based_position() {
        assert_eq!(message_key(0), "message_0");
        assert_eq!(message_key(12), "message_12");
    }
}

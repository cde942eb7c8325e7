use async_trait::async_trait;

use crate::domain::{DomainError, Message, SessionId};

/// Document-store persistence for chat sessions.
///
/// Sessions are collections keyed by [`SessionId`]; each holds message
/// documents keyed by their position (see [`crate::domain::message_key`]).
/// The model is append-only.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// All sessions holding at least one message. Order is unspecified.
    async fn list_sessions(&self) -> Result<Vec<SessionId>, DomainError>;

    /// Messages of a session ordered by position. Empty when unknown.
    async fn load_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError>;

    /// Writes `message` at `position`, silently replacing any message
    /// already stored there.
    async fn append_message(
        &self,
        session_id: &SessionId,
        position: u64,
        message: &Message,
    ) -> Result<(), DomainError>;

    /// `false` for stores that drop everything they are given.
    fn is_persistent(&self) -> bool {
        true
    }
}

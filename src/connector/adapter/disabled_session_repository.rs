use std::fmt::Display;

use async_trait::async_trait;
use tracing::debug;

use crate::application::SessionRepository;
use crate::domain::{DomainError, Message, SessionId};

/// Stand-in used when the document store is unavailable or switched off.
/// Accepts every write and remembers nothing.
pub struct DisabledSessionRepository;

impl DisabledSessionRepository {
    pub fn because(reason: impl Display) -> Self {
        debug!("Session persistence disabled: {}", reason);
        Self
    }
}

#[async_trait]
impl SessionRepository for DisabledSessionRepository {
    async fn list_sessions(&self) -> Result<Vec<SessionId>, DomainError> {
        Ok(Vec::new())
    }

    async fn load_messages(&self, _session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        Ok(Vec::new())
    }

    async fn append_message(
        &self,
        _session_id: &SessionId,
        _position: u64,
        _message: &Message,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::current_timestamp;
use crate::application::SessionRepository;
use crate::domain::{message_key, DomainError, Message, SessionId};

/// Process-local session store with the same overwrite-by-position
/// semantics as the persistent one.
pub struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, BTreeMap<u64, Message>>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn list_sessions(&self) -> Result<Vec<SessionId>, DomainError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.keys().cloned().collect())
    }

    async fn load_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(session_id)
            .map(|messages| messages.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        position: u64,
        message: &Message,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.lock().await;
        let stored = Message::reconstitute(
            message.role(),
            message.content().to_string(),
            Some(current_timestamp()),
        );
        sessions
            .entry(session_id.clone())
            .or_default()
            .insert(position, stored);

        debug!(
            "Stored {} in session {} (memory)",
            message_key(position),
            session_id.short()
        );
        Ok(())
    }
}

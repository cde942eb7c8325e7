use anyhow::{ensure, Result};

use crate::domain::SessionId;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// One turn outside the interactive loop. The turn is appended to
    /// `session` when given, otherwise to a fresh session.
    pub async fn ask(&self, query: String, session: Option<String>) -> Result<String> {
        ensure!(!query.trim().is_empty(), "query must not be empty");

        let chat = self.container.chat_use_case();
        let session = chat.open(session.map(SessionId::from)).await;
        let session = chat.handle_input(session, &query).await;

        let reply = session
            .last_message()
            .filter(|m| !m.is_user())
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        if chat.persistence_enabled() {
            Ok(format!("{}\n\n[session {}]", reply, session.id()))
        } else {
            Ok(reply)
        }
    }
}

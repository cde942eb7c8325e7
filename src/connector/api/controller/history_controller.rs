use anyhow::Result;

use crate::domain::SessionId;

use super::super::Container;
use super::transcript::format_transcript;

pub struct HistoryController<'a> {
    container: &'a Container,
}

impl<'a> HistoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn show(&self, session_id: String) -> Result<String> {
        let session = self
            .container
            .chat_use_case()
            .select_session(SessionId::from(session_id))
            .await;

        if session.is_empty() {
            return Ok(format!("No messages in session {}.", session.id()));
        }
        Ok(format!(
            "Session {}\n\n{}",
            session.id(),
            format_transcript(&session)
        ))
    }
}

use anyhow::Result;

use super::super::Container;
use super::transcript::format_session_list;

pub struct SessionsController<'a> {
    container: &'a Container,
}

impl<'a> SessionsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let chat = self.container.chat_use_case();
        if !chat.persistence_enabled() {
            return Ok("Chat history is not being saved, so there are no sessions to list.".to_string());
        }

        let ids = chat.list_sessions().await;
        if ids.is_empty() {
            return Ok("No saved sessions.".to_string());
        }

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let count = chat.select_session(id.clone()).await.len();
            entries.push((id, count));
        }
        Ok(format_session_list(&entries, None))
    }
}

use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ChatController, HistoryController, SessionsController};

pub struct Router<'a> {
    chat_controller: ChatController<'a>,
    ask_controller: AskController<'a>,
    sessions_controller: SessionsController<'a>,
    history_controller: HistoryController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            chat_controller: ChatController::new(container),
            ask_controller: AskController::new(container),
            sessions_controller: SessionsController::new(container),
            history_controller: HistoryController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Chat { session } => self.chat_controller.run(session).await,
            Commands::Ask { query, session } => self.ask_controller.ask(query, session).await,
            Commands::Sessions => self.sessions_controller.list().await,
            Commands::History { session_id } => self.history_controller.show(session_id).await,
        }
    }
}

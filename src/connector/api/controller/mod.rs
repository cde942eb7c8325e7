pub mod ask_controller;
pub mod chat_controller;
pub mod history_controller;
pub mod sessions_controller;
pub mod transcript;

pub use ask_controller::AskController;
pub use chat_controller::{ChatController, SlashCommand};
pub use history_controller::HistoryController;
pub use sessions_controller::SessionsController;

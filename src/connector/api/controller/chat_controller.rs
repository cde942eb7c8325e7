use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::{ChatSession, SessionId};

use super::super::Container;
use super::transcript::{
    format_message, format_session_list, format_transcript, INPUT_HINT, INTRO, TITLE,
};

const THINKING: &str = "Finding the perfect tune...";

const HELP: &str = "\
Commands:
  /new            start a new session
  /sessions       list saved sessions
  /switch <id>    continue a saved session
  /history        show the current session
  /help           show this help
  /quit           leave";

/// A line starting with `/` typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    New,
    Sessions,
    Switch(String),
    History,
    Help,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// Parses the text after the leading `/`.
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        match (name.as_str(), argument) {
            ("new", _) => SlashCommand::New,
            ("sessions" | "list", _) => SlashCommand::Sessions,
            ("switch" | "load", Some(id)) => SlashCommand::Switch(id.to_string()),
            ("history", _) => SlashCommand::History,
            ("help" | "?", _) => SlashCommand::Help,
            ("quit" | "exit" | "q", _) => SlashCommand::Quit,
            _ => SlashCommand::Unknown(input.trim().to_string()),
        }
    }
}

/// The interactive loop: one line in, one reply out.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn run(&self, session: Option<String>) -> Result<String> {
        let chat = self.container.chat_use_case();
        let mut session = chat.open(session.map(SessionId::from)).await;

        println!("{}\n{}\n", TITLE, INTRO);
        self.print_session_header(&session);
        if !session.is_empty() {
            println!("{}\n", format_transcript(&session));
        }
        println!("{} (type /help for commands)", INPUT_HINT);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(command) = trimmed.strip_prefix('/') {
                match SlashCommand::parse(command) {
                    SlashCommand::Quit => break,
                    command => session = self.run_command(command, session).await,
                }
                continue;
            }

            self.container.spinner().start(THINKING);
            session = chat.handle_input(session, &line).await;
            self.container.spinner().finish();

            if let Some(reply) = session.last_message() {
                println!("\n{}", format_message(reply));
            }
        }

        Ok(format!("Goodbye! (session {})", session.id()))
    }

    async fn run_command(&self, command: SlashCommand, session: ChatSession) -> ChatSession {
        let chat = self.container.chat_use_case();
        match command {
            SlashCommand::New => {
                let session = chat.start_new_session();
                self.print_session_header(&session);
                session
            }
            SlashCommand::Sessions => {
                let ids = chat.list_sessions().await;
                if ids.is_empty() {
                    println!("No saved sessions.");
                } else {
                    let mut entries = Vec::with_capacity(ids.len());
                    for id in ids {
                        let count = chat.select_session(id.clone()).await.len();
                        entries.push((id, count));
                    }
                    println!("{}", format_session_list(&entries, Some(session.id())));
                }
                session
            }
            SlashCommand::Switch(id) => {
                let session = chat.select_session(SessionId::from(id)).await;
                self.print_session_header(&session);
                if !session.is_empty() {
                    println!("{}", format_transcript(&session));
                }
                session
            }
            SlashCommand::History => {
                if session.is_empty() {
                    println!("No messages yet.");
                } else {
                    println!("{}", format_transcript(&session));
                }
                session
            }
            SlashCommand::Help => {
                println!("{}", HELP);
                session
            }
            SlashCommand::Unknown(input) => {
                println!("Unknown command: /{}. Type /help for the list.", input);
                session
            }
            SlashCommand::Quit => session,
        }
    }

    fn print_session_header(&self, session: &ChatSession) {
        let chat = self.container.chat_use_case();
        let persistence = if chat.persistence_enabled() {
            "saved"
        } else {
            "not saved"
        };
        println!(
            "Session {} [{} messages, {}]",
            session.id().short(),
            session.len(),
            persistence
        );
    }
}

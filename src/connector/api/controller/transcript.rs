use crate::domain::{ChatSession, Message, Role, SessionId};

pub const TITLE: &str = "🎵 Tune Buddy";
pub const INTRO: &str = "Your personal AI music companion. Tell me your mood, a genre, or an artist, and I'll find the perfect tune for you!";
pub const INPUT_HINT: &str = "What kind of music are you in the mood for?";

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => TITLE,
    }
}

pub fn format_message(message: &Message) -> String {
    format!("{}: {}", speaker(message.role()), message.content())
}

pub fn format_transcript(session: &ChatSession) -> String {
    session
        .messages()
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_session_list(entries: &[(SessionId, usize)], current: Option<&SessionId>) -> String {
    let mut output = "Saved sessions:\n\n".to_string();
    for (id, count) in entries {
        let marker = if Some(id) == current { "*" } else { " " };
        output.push_str(&format!("{} {} ({} messages)\n", marker, id, count));
    }
    output
}

mod chat_session;
mod get_recommendation;

pub use chat_session::*;
pub use get_recommendation::*;

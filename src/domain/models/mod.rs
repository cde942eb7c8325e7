mod message;
mod notice;
mod recommendation;
mod session;

pub use message::*;
pub use notice::*;
pub use recommendation::*;
pub use session::*;

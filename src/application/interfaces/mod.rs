mod notifier;
mod recommendation_service;
mod session_repository;

pub use notifier::*;
pub use recommendation_service::*;
pub use session_repository::*;

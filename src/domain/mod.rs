//! # Domain Layer
//!
//! Chat sessions, messages and the recommendation value types.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::*;
pub use models::*;

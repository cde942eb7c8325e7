//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Recommendation endpoint (Dify over HTTP, scripted mock)
//! - Session storage (DuckDB documents, in-memory, disabled)
//! - Notices (console, recording)
//! - CLI wiring (container, router, controllers)

pub mod adapter;
pub mod api;

pub use adapter::*;

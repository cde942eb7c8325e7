use async_trait::async_trait;

use crate::domain::{DomainError, RecommendationReply, RecommendationRequest};

/// Sends one user query to a conversational-AI endpoint and returns its
/// decoded reply.
///
/// Implementors encapsulate transport, authentication and the vendor's wire
/// format. Any transport-level failure (unreachable host, non-2xx status,
/// undecodable body) is reported as [`DomainError::Transport`]; fallback
/// texts are applied by the caller, not here.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationReply, DomainError>;

    /// Human readable name of the backend, for logs.
    fn backend_name(&self) -> &str;
}

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::RecommendationService;
use crate::domain::{DomainError, RecommendationReply, RecommendationRequest};

/// Scripted [`RecommendationService`] for offline runs and tests.
///
/// Replies are handed out in order; the last one repeats once the script
/// runs out. Every request is recorded.
pub struct MockRecommendation {
    replies: Mutex<VecDeque<Result<RecommendationReply, String>>>,
    last: Mutex<Option<Result<RecommendationReply, String>>>,
    requests: Mutex<Vec<RecommendationRequest>>,
}

impl MockRecommendation {
    fn scripted(replies: Vec<Result<RecommendationReply, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(RecommendationReply {
            answer: Some(answer.into()),
            conversation_id: None,
        })])
    }

    /// Replies without an `answer` field.
    pub fn silent() -> Self {
        Self::scripted(vec![Ok(RecommendationReply::default())])
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::scripted(vec![Err(reason.into())])
    }

    pub fn with_replies(replies: Vec<RecommendationReply>) -> Self {
        Self::scripted(replies.into_iter().map(Ok).collect())
    }

    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> Result<RecommendationReply, String> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| "mock reply script poisoned".to_string())?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| "mock reply script poisoned".to_string())?;

        if let Some(reply) = replies.pop_front() {
            *last = Some(reply);
        }
        last.clone()
            .unwrap_or_else(|| Ok(RecommendationReply::default()))
    }
}

#[async_trait]
impl RecommendationService for MockRecommendation {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationReply, DomainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.next_reply().map_err(DomainError::transport)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

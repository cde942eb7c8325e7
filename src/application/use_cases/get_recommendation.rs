use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{Notifier, RecommendationService};
use crate::domain::{Notice, Recommendation, RecommendationRequest, DEFAULT_END_USER};

/// Asks the recommendation endpoint for a reply to one query.
///
/// Never fails: transport errors and missing configuration are reported
/// through the [`Notifier`] and turned into fixed fallback texts, so the
/// caller always gets something non-empty to display.
pub struct GetRecommendationUseCase {
    service: Option<Arc<dyn RecommendationService>>,
    notifier: Arc<dyn Notifier>,
    user: String,
}

impl GetRecommendationUseCase {
    /// `service` is `None` when the API key or URL is not configured.
    pub fn new(service: Option<Arc<dyn RecommendationService>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            user: DEFAULT_END_USER.to_string(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub async fn execute(&self, query: &str, conversation_id: Option<&str>) -> Recommendation {
        let Some(service) = self.service.as_ref() else {
            self.notifier.notify(Notice::error(
                "API key or URL not found. Set TUNEBUDDY_API_KEY and TUNEBUDDY_API_URL.",
            ));
            return Recommendation::unconfigured();
        };

        let query = query.trim();
        if query.is_empty() {
            debug!("Skipping recommendation for blank query");
            return Recommendation::no_answer(conversation_id.map(str::to_string));
        }

        let request = RecommendationRequest::new(query, self.user.as_str())
            .with_conversation_id(conversation_id.map(str::to_string));

        info!(
            "Requesting recommendation from {} (context={})",
            service.backend_name(),
            request.conversation_id().is_some()
        );
        let start_time = Instant::now();

        match service.recommend(&request).await {
            Ok(reply) => {
                debug!("Recommendation received in {:?}", start_time.elapsed());
                let conversation_id = reply
                    .conversation_id
                    .or_else(|| request.conversation_id().map(str::to_string));
                match reply.answer {
                    Some(answer) if !answer.trim().is_empty() => {
                        Recommendation::answered(answer, conversation_id)
                    }
                    _ => {
                        warn!("Recommendation reply carried no answer");
                        Recommendation::no_answer(conversation_id)
                    }
                }
            }
            Err(e) => {
                info!("Recommendation request failed: {}", e);
                self.notifier
                    .notify(Notice::error(format!("API Request Error: {}", e)));
                Recommendation::transport_fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{MockRecommendation, RecordingNotifier};
    use crate::domain::{
        NoticeLevel, RecommendationOutcome, CONFIGURATION_ERROR_REPLY, NO_RECOMMENDATION_REPLY,
        TRANSPORT_FALLBACK_REPLY,
    };

    fn use_case(
        service: Option<Arc<MockRecommendation>>,
    ) -> (GetRecommendationUseCase, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = service.map(|s| s as Arc<dyn RecommendationService>);
        (GetRecommendationUseCase::new(service, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn test_answer_is_returned_verbatim() {
        let mock = Arc::new(MockRecommendation::answering("Listen to Kind of Blue"));
        let (use_case, notifier) = use_case(Some(mock));

        let rec = use_case.execute("some jazz", None).await;

        assert_eq!(rec.text(), "Listen to Kind of Blue");
        assert_eq!(rec.outcome(), RecommendationOutcome::Answered);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_missing_answer_yields_placeholder() {
        let mock = Arc::new(MockRecommendation::silent());
        let (use_case, _) = use_case(Some(mock));

        let rec = use_case.execute("anything", None).await;

        assert_eq!(rec.text(), NO_RECOMMENDATION_REPLY);
        assert_eq!(rec.outcome(), RecommendationOutcome::NoAnswer);
    }

    #[tokio::test]
    async fn test_transport_failure_yields_fallback_and_notice() {
        let mock = Arc::new(MockRecommendation::failing("connection refused"));
        let (use_case, notifier) = use_case(Some(mock));

        let rec = use_case.execute("rock", None).await;

        assert_eq!(rec.text(), TRANSPORT_FALLBACK_REPLY);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Error);
        assert!(notices[0].message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_yields_configuration_error() {
        let (use_case, notifier) = use_case(None);

        let rec = use_case.execute("pop", None).await;

        assert_eq!(rec.text(), CONFIGURATION_ERROR_REPLY);
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_context_token_is_passed_through() {
        let mock = Arc::new(MockRecommendation::answering("ok"));
        let (use_case, _) = use_case(Some(mock.clone()));

        let rec = use_case.execute("more like that", Some("conv-7")).await;

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].conversation_id(), Some("conv-7"));
        assert_eq!(requests[0].user(), DEFAULT_END_USER);
        assert_eq!(rec.conversation_id(), Some("conv-7"));
    }

    #[tokio::test]
    async fn test_blank_query_does_not_reach_the_service() {
        let mock = Arc::new(MockRecommendation::answering("ok"));
        let (use_case, _) = use_case(Some(mock.clone()));

        let rec = use_case.execute("   ", None).await;

        assert!(mock.requests().is_empty());
        assert!(!rec.text().is_empty());
    }
}

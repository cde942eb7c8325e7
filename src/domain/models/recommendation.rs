use serde::Deserialize;

/// Shown when the endpoint answered but carried no `answer` text.
pub const NO_RECOMMENDATION_REPLY: &str = "Sorry, I couldn't get a recommendation right now.";
/// Shown when the endpoint could not be reached or replied with garbage.
pub const TRANSPORT_FALLBACK_REPLY: &str = "Sorry, there was an issue connecting to the service.";
/// Shown when the API key or URL is missing.
pub const CONFIGURATION_ERROR_REPLY: &str = "API configuration error.";

pub const DEFAULT_END_USER: &str = "tunebuddy-user";

/// What gets sent to the recommendation endpoint for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    query: String,
    user: String,
    conversation_id: Option<String>,
}

impl RecommendationRequest {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user: user.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }
}

/// The decoded reply of the endpoint, before any fallback is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecommendationReply {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// How a recommendation text came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Answered,
    NoAnswer,
    TransportFallback,
    Unconfigured,
}

/// Text to display for one turn. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    text: String,
    outcome: RecommendationOutcome,
    conversation_id: Option<String>,
}

impl Recommendation {
    pub fn answered(text: String, conversation_id: Option<String>) -> Self {
        Self {
            text,
            outcome: RecommendationOutcome::Answered,
            conversation_id,
        }
    }

    pub fn no_answer(conversation_id: Option<String>) -> Self {
        Self {
            text: NO_RECOMMENDATION_REPLY.to_string(),
            outcome: RecommendationOutcome::NoAnswer,
            conversation_id,
        }
    }

    pub fn transport_fallback() -> Self {
        Self {
            text: TRANSPORT_FALLBACK_REPLY.to_string(),
            outcome: RecommendationOutcome::TransportFallback,
            conversation_id: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            text: CONFIGURATION_ERROR_REPLY.to_string(),
            outcome: RecommendationOutcome::Unconfigured,
            conversation_id: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn outcome(&self) -> RecommendationOutcome {
        self.outcome
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }
}

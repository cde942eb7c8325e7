pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatSessionUseCase, GetRecommendationUseCase, Notifier, RecommendationService,
    SessionRepository,
};

pub use cli::Commands;

pub use connector::api::{Container, ContainerConfig, Router};
pub use connector::{
    ActiveSpinner, ConsoleNotifier, DifyClient, DisabledSessionRepository, DuckdbSessionRepository,
    InMemorySessionRepository, MockRecommendation, RecordingNotifier, StoreCredentials,
};

pub use domain::{
    message_key, ChatSession, DomainError, Message, Notice, NoticeLevel, Recommendation,
    RecommendationOutcome, RecommendationReply, RecommendationRequest, Role, SessionId,
    CONFIGURATION_ERROR_REPLY, DEFAULT_END_USER, NO_RECOMMENDATION_REPLY,
    TRANSPORT_FALLBACK_REPLY,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{GetRecommendationUseCase, Notifier, SessionRepository};
use crate::domain::{ChatSession, DomainError, Message, Notice, SessionId};

/// Drives the chat-session lifecycle.
///
/// Every handler takes the current [`ChatSession`] by value and returns the
/// updated one; this type keeps no per-conversation state of its own.
/// Persistence is best effort: the first store failure is reported once and
/// switches the rest of the run to in-memory operation.
pub struct ChatSessionUseCase {
    session_repo: Arc<dyn SessionRepository>,
    recommendation: GetRecommendationUseCase,
    notifier: Arc<dyn Notifier>,
    persistence_enabled: AtomicBool,
    retain_context: bool,
}

impl ChatSessionUseCase {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        recommendation: GetRecommendationUseCase,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let persistence_enabled = AtomicBool::new(session_repo.is_persistent());
        Self {
            session_repo,
            recommendation,
            notifier,
            persistence_enabled,
            retain_context: false,
        }
    }

    /// Carry the endpoint's conversation token from one turn to the next.
    pub fn with_retained_context(mut self, retain_context: bool) -> Self {
        self.retain_context = retain_context;
        self
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled.load(Ordering::Relaxed)
    }

    pub fn start_new_session(&self) -> ChatSession {
        let session = ChatSession::new();
        info!("Started new session {}", session.id());
        session
    }

    /// Resumes `requested` when given, otherwise starts fresh.
    pub async fn open(&self, requested: Option<SessionId>) -> ChatSession {
        match requested {
            Some(id) => self.select_session(id).await,
            None => self.start_new_session(),
        }
    }

    /// Replaces the in-memory view with the persisted history of `id`.
    ///
    /// When the history cannot be read the session starts out empty.
    pub async fn select_session(&self, id: SessionId) -> ChatSession {
        if !self.persistence_enabled() {
            debug!("Persistence disabled, selecting {} with empty history", id);
            return ChatSession::with_id(id);
        }

        match self.session_repo.load_messages(&id).await {
            Ok(messages) => {
                info!("Loaded {} messages for session {}", messages.len(), id);
                ChatSession::from_history(id, messages)
            }
            Err(e) => {
                self.disable_persistence(&e);
                ChatSession::with_id(id)
            }
        }
    }

    /// Known session ids; empty when persistence is unavailable.
    pub async fn list_sessions(&self) -> Vec<SessionId> {
        if !self.persistence_enabled() {
            return Vec::new();
        }

        match self.session_repo.list_sessions().await {
            Ok(ids) => ids,
            Err(e) => {
                self.disable_persistence(&e);
                Vec::new()
            }
        }
    }

    pub async fn append_user_message(&self, session: ChatSession, text: &str) -> ChatSession {
        self.append(session, Message::user(text)).await
    }

    pub async fn append_assistant_message(&self, session: ChatSession, text: &str) -> ChatSession {
        self.append(session, Message::assistant(text)).await
    }

    /// One full chat turn: the user's text as typed, the endpoint's reply,
    /// both appended in that order. Blank input leaves the session untouched.
    pub async fn handle_input(&self, session: ChatSession, input: &str) -> ChatSession {
        if input.trim().is_empty() {
            return session;
        }

        let mut session = self.append_user_message(session, input).await;

        let context = if self.retain_context {
            session.conversation_id().map(str::to_string)
        } else {
            None
        };
        let recommendation = self.recommendation.execute(input, context.as_deref()).await;

        if self.retain_context {
            if let Some(conversation_id) = recommendation.conversation_id() {
                session.set_conversation_id(Some(conversation_id.to_string()));
            }
        }

        self.append_assistant_message(session, recommendation.text())
            .await
    }

    async fn append(&self, mut session: ChatSession, message: Message) -> ChatSession {
        let position = session.next_position();
        session.push(message.clone());

        if self.persistence_enabled() {
            if let Err(e) = self
                .session_repo
                .append_message(session.id(), position, &message)
                .await
            {
                self.disable_persistence(&e);
            }
        }

        session
    }

    fn disable_persistence(&self, error: &DomainError) {
        if self.persistence_enabled.swap(false, Ordering::Relaxed) {
            info!("Session store failed, continuing without persistence: {}", error);
            self.notifier.notify(Notice::warning(format!(
                "Chat history could not be saved ({}). Continuing without persistence.",
                error
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::RecommendationService;
    use crate::connector::{
        DisabledSessionRepository, InMemorySessionRepository, MockRecommendation,
        RecordingNotifier,
    };
    use crate::domain::{RecommendationReply, Role};

    struct FailingRepository;

    #[async_trait]
    impl SessionRepository for FailingRepository {
        async fn list_sessions(&self) -> Result<Vec<SessionId>, DomainError> {
            Err(DomainError::persistence("store offline"))
        }

        async fn load_messages(&self, _: &SessionId) -> Result<Vec<Message>, DomainError> {
            Err(DomainError::persistence("store offline"))
        }

        async fn append_message(
            &self,
            _: &SessionId,
            _: u64,
            _: &Message,
        ) -> Result<(), DomainError> {
            Err(DomainError::persistence("store offline"))
        }
    }

    fn chat(
        repo: Arc<dyn SessionRepository>,
        mock: Arc<MockRecommendation>,
    ) -> (ChatSessionUseCase, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let recommendation = GetRecommendationUseCase::new(
            Some(mock as Arc<dyn RecommendationService>),
            notifier.clone(),
        );
        (
            ChatSessionUseCase::new(repo, recommendation, notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn test_turn_appends_user_then_assistant() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::answering("Try Bonobo"));
        let (chat, _) = chat(repo.clone(), mock);

        let session = chat.start_new_session();
        let session = chat.handle_input(session, "chill electronic").await;

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(session.messages()[1].content(), "Try Bonobo");

        let stored = repo.load_messages(session.id()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].content(), "chill electronic");
    }

    #[tokio::test]
    async fn test_select_session_restores_persisted_order() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::answering("reply"));
        let (chat, _) = chat(repo.clone(), mock);

        let session = chat.start_new_session();
        let session = chat.handle_input(session, "first").await;
        let session = chat.handle_input(session, "second").await;
        let id = session.id().clone();

        let reloaded = chat.select_session(id).await;

        assert_eq!(reloaded.messages().len(), 4);
        assert_eq!(
            reloaded.messages().iter().map(|m| m.content()).collect::<Vec<_>>(),
            session.messages().iter().map(|m| m.content()).collect::<Vec<_>>()
        );
        assert_eq!(reloaded.next_position(), 4);
    }

    #[tokio::test]
    async fn test_new_sessions_get_distinct_ids() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let (chat, _) = chat(repo, Arc::new(MockRecommendation::silent()));

        let mut previous = chat.start_new_session();
        for _ in 0..1_000 {
            let next = chat.start_new_session();
            assert_ne!(next.id(), previous.id());
            assert!(next.is_empty());
            previous = next;
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_once() {
        let (chat, notifier) = chat(
            Arc::new(FailingRepository),
            Arc::new(MockRecommendation::answering("still here")),
        );

        let session = chat.start_new_session();
        let session = chat.handle_input(session, "one").await;
        let session = chat.handle_input(session, "two").await;

        assert_eq!(session.len(), 4);
        assert!(!chat.persistence_enabled());
        assert_eq!(notifier.notices().len(), 1);
        assert!(chat.list_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_store_works_in_memory_without_notices() {
        let (chat, notifier) = chat(
            Arc::new(DisabledSessionRepository::because("switched off")),
            Arc::new(MockRecommendation::answering("ok")),
        );

        let session = chat.handle_input(chat.start_new_session(), "hello").await;

        assert_eq!(session.len(), 2);
        assert!(!chat.persistence_enabled());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_user_message_is_stored_as_typed() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::answering("ok"));
        let (chat, _) = chat(repo.clone(), mock.clone());

        let session = chat
            .handle_input(chat.start_new_session(), "  sad songs\t")
            .await;

        assert_eq!(session.messages()[0].content(), "  sad songs\t");
        let stored = repo.load_messages(session.id()).await.unwrap();
        assert_eq!(stored[0].content(), "  sad songs\t");
        assert_eq!(mock.requests()[0].query(), "sad songs");
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::answering("ok"));
        let (chat, _) = chat(repo, mock.clone());

        let session = chat.handle_input(chat.start_new_session(), "  \n").await;

        assert!(session.is_empty());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_context_is_only_forwarded_when_retained() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::with_replies(vec![
            RecommendationReply {
                answer: Some("first".to_string()),
                conversation_id: Some("conv-1".to_string()),
            },
            RecommendationReply {
                answer: Some("second".to_string()),
                conversation_id: Some("conv-1".to_string()),
            },
        ]));
        let (chat, _) = chat(repo, mock.clone());
        let chat = chat.with_retained_context(true);

        let session = chat.handle_input(chat.start_new_session(), "a").await;
        assert_eq!(session.conversation_id(), Some("conv-1"));
        let _ = chat.handle_input(session, "b").await;

        let requests = mock.requests();
        assert_eq!(requests[0].conversation_id(), None);
        assert_eq!(requests[1].conversation_id(), Some("conv-1"));
    }

    #[tokio::test]
    async fn test_context_is_dropped_by_default() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let mock = Arc::new(MockRecommendation::with_replies(vec![RecommendationReply {
            answer: Some("first".to_string()),
            conversation_id: Some("conv-1".to_string()),
        }]));
        let (chat, _) = chat(repo, mock.clone());

        let session = chat.handle_input(chat.start_new_session(), "a").await;
        let _ = chat.handle_input(session, "b").await;

        assert!(mock.requests().iter().all(|r| r.conversation_id().is_none()));
    }
}

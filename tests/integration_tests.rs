use std::sync::Arc;

use axum::http::header;
use axum::routing::post;
use tempfile::tempdir;
use tunebuddy::{
    Commands, Container, ContainerConfig, DifyClient, DisabledSessionRepository,
    DuckdbSessionRepository, MockRecommendation, NoticeLevel, RecommendationService,
    RecordingNotifier, Role, Router, SessionRepository, StoreCredentials,
    CONFIGURATION_ERROR_REPLY,
};

async fn spawn_answering_stub(answer: &'static str) -> String {
    let app = axum::Router::new().route(
        "/v1/chat-messages",
        post(move || async move {
            (
                [(header::CONTENT_TYPE, "application/json")],
                format!(r#"{{"answer": "{}", "conversation_id": "conv-1"}}"#, answer),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v1", addr)
}

fn duckdb_repo(path: &std::path::Path) -> Arc<dyn SessionRepository> {
    let credentials = StoreCredentials::from_json(r#"{"project_id": "tunebuddy"}"#).unwrap();
    Arc::new(DuckdbSessionRepository::new(path, &credentials).unwrap())
}

#[tokio::test]
async fn conversation_is_persisted_and_resumed_in_order() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("tunebuddy.duckdb");
    let base = spawn_answering_stub("Try Bonobo - Kerala").await;

    let session_id = {
        let notifier = Arc::new(RecordingNotifier::new());
        let service: Arc<dyn RecommendationService> = Arc::new(DifyClient::new("k", &base));
        let container = Container::assemble(
            ContainerConfig::default(),
            notifier.clone(),
            Some(service),
            duckdb_repo(&db_path),
        );
        let chat = container.chat_use_case();

        let session = chat.start_new_session();
        let session = chat.handle_input(session, "something upbeat").await;
        let session = chat.handle_input(session, "and another").await;

        assert_eq!(session.len(), 4);
        assert!(notifier.notices().is_empty());
        session.id().clone()
    };

    let notifier = Arc::new(RecordingNotifier::new());
    let container = Container::assemble(
        ContainerConfig::default(),
        notifier.clone(),
        Some(Arc::new(MockRecommendation::answering("Third pick"))),
        duckdb_repo(&db_path),
    );
    let chat = container.chat_use_case();

    let session = chat.select_session(session_id.clone()).await;
    let contents: Vec<&str> = session.messages().iter().map(|m| m.content()).collect();
    assert_eq!(
        contents,
        vec![
            "something upbeat",
            "Try Bonobo - Kerala",
            "and another",
            "Try Bonobo - Kerala"
        ]
    );
    assert_eq!(session.messages()[0].role(), Role::User);
    assert_eq!(session.messages()[1].role(), Role::Assistant);

    // New turns continue after the loaded history instead of overwriting it.
    let session = chat.handle_input(session, "one more").await;
    assert_eq!(session.next_position(), 6);

    let reloaded = chat.select_session(session_id.clone()).await;
    assert_eq!(reloaded.len(), 6);
    assert_eq!(reloaded.messages()[5].content(), "Third pick");
    assert!(chat.list_sessions().await.contains(&session_id));
}

#[tokio::test]
async fn disabled_store_keeps_chat_working_in_memory() {
    let notifier = Arc::new(RecordingNotifier::new());
    let container = Container::assemble(
        ContainerConfig::default(),
        notifier.clone(),
        Some(Arc::new(MockRecommendation::answering("Lo-fi hip hop radio"))),
        Arc::new(DisabledSessionRepository::because("credentials missing")),
    );
    let chat = container.chat_use_case();

    assert!(!chat.persistence_enabled());
    let session = chat.start_new_session();
    let session = chat.handle_input(session, "study music").await;

    assert_eq!(session.len(), 2);
    assert_eq!(session.messages()[1].content(), "Lo-fi hip hop radio");
    assert!(chat.list_sessions().await.is_empty());
    assert!(chat.select_session(session.id().clone()).await.is_empty());
}

#[tokio::test]
async fn unconfigured_endpoint_answers_with_configuration_error() {
    let notifier = Arc::new(RecordingNotifier::new());
    let container = Container::assemble(
        ContainerConfig::default(),
        notifier.clone(),
        None,
        Arc::new(DisabledSessionRepository::because("test")),
    );

    let router = Router::new(&container);
    let output = router
        .route(Commands::Ask {
            query: "anything".to_string(),
            session: None,
        })
        .await
        .unwrap();

    assert_eq!(output, CONFIGURATION_ERROR_REPLY);
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level(), NoticeLevel::Error);
}

#[tokio::test]
async fn ask_and_history_share_the_store() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("tunebuddy.duckdb");

    let notifier = Arc::new(RecordingNotifier::new());
    let container = Container::assemble(
        ContainerConfig::default(),
        notifier,
        Some(Arc::new(MockRecommendation::answering("Khruangbin - Maria También"))),
        duckdb_repo(&db_path),
    );
    let router = Router::new(&container);

    let output = router
        .route(Commands::Ask {
            query: "desert surf rock".to_string(),
            session: None,
        })
        .await
        .unwrap();
    assert!(output.starts_with("Khruangbin - Maria También"));

    let sessions = container.chat_use_case().list_sessions().await;
    assert_eq!(sessions.len(), 1);

    let history = router
        .route(Commands::History {
            session_id: sessions[0].to_string(),
        })
        .await
        .unwrap();
    assert!(history.contains("You: desert surf rock"));
    assert!(history.contains("Khruangbin - Maria También"));
}

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{
    ChatSessionUseCase, GetRecommendationUseCase, Notifier, RecommendationService,
    SessionRepository,
};
use crate::connector::{
    ActiveSpinner, ConsoleNotifier, DifyClient, DisabledSessionRepository, DuckdbSessionRepository,
    InMemorySessionRepository, MockRecommendation, StoreCredentials,
};
use crate::domain::{DomainError, Notice, DEFAULT_END_USER};

const DATABASE_FILE: &str = "tunebuddy.duckdb";
const MOCK_ANSWER: &str = "Try \"Weightless\" by Marconi Union. (offline demo reply)";

pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep sessions in process memory instead of the document store.
    pub memory_storage: bool,
    /// Do not persist sessions at all.
    pub no_persist: bool,
    /// Answer from a canned script instead of calling the endpoint.
    pub mock_recommendations: bool,
    /// Forward the endpoint's conversation token between turns.
    pub retain_context: bool,
    /// End-user identifier sent with every request.
    pub user: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            memory_storage: false,
            no_persist: false,
            mock_recommendations: false,
            retain_context: false,
            user: DEFAULT_END_USER.to_string(),
        }
    }
}

pub struct Container {
    chat_use_case: ChatSessionUseCase,
    spinner: ActiveSpinner,
}

impl Container {
    /// Console notices, secrets and store credentials from the environment.
    pub fn new(config: ContainerConfig) -> Self {
        let spinner = ActiveSpinner::new();
        let notifier = Arc::new(ConsoleNotifier::with_spinner(spinner.clone()));
        Self::with_credentials(config, notifier, StoreCredentials::from_env()).with_spinner(spinner)
    }

    pub fn with_notifier(config: ContainerConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_credentials(config, notifier, StoreCredentials::from_env())
    }

    /// Like [`Container::with_notifier`] but with the store credentials
    /// already resolved.
    pub fn with_credentials(
        config: ContainerConfig,
        notifier: Arc<dyn Notifier>,
        credentials: Result<StoreCredentials, DomainError>,
    ) -> Self {
        let service = Self::recommendation_service(&config);
        let session_repo = Self::session_repository(&config, credentials, notifier.as_ref());
        Self::assemble(config, notifier, service, session_repo)
    }

    /// Wires explicit adapters; used by tests and embedders.
    pub fn assemble(
        config: ContainerConfig,
        notifier: Arc<dyn Notifier>,
        service: Option<Arc<dyn RecommendationService>>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        let recommendation = GetRecommendationUseCase::new(service, notifier.clone())
            .with_user(config.user.clone());
        let chat_use_case = ChatSessionUseCase::new(session_repo, recommendation, notifier)
            .with_retained_context(config.retain_context);

        Self {
            chat_use_case,
            spinner: ActiveSpinner::new(),
        }
    }

    fn with_spinner(mut self, spinner: ActiveSpinner) -> Self {
        self.spinner = spinner;
        self
    }

    fn recommendation_service(config: &ContainerConfig) -> Option<Arc<dyn RecommendationService>> {
        if config.mock_recommendations {
            debug!("Using mock recommendation service");
            return Some(Arc::new(MockRecommendation::answering(MOCK_ANSWER)));
        }

        match DifyClient::from_env() {
            Ok(client) => {
                debug!("Using Dify endpoint at {}", client.url());
                Some(Arc::new(client))
            }
            Err(e) => {
                // Reported to the user on every chat turn.
                info!("Recommendation endpoint not configured: {}", e);
                None
            }
        }
    }

    /// Picks the session store. Any failure here disables persistence for
    /// the whole run and is reported exactly once.
    fn session_repository(
        config: &ContainerConfig,
        credentials: Result<StoreCredentials, DomainError>,
        notifier: &dyn Notifier,
    ) -> Arc<dyn SessionRepository> {
        if config.no_persist {
            info!("Session persistence switched off");
            return Arc::new(DisabledSessionRepository::because("switched off"));
        }

        if config.memory_storage {
            debug!("Using in-memory session storage");
            return Arc::new(InMemorySessionRepository::new());
        }

        let credentials = match credentials {
            Ok(credentials) => credentials,
            Err(e) => {
                info!("Document store not configured: {}", e);
                notifier.notify(Notice::warning(format!(
                    "Document store credentials not found ({}). Chat history will not be saved.",
                    e
                )));
                return Arc::new(DisabledSessionRepository::because(e));
            }
        };

        let db_path = credentials.database_path_or(&default_db_path(config));
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                info!("Failed to create {}: {}", parent.display(), e);
                notifier.notify(Notice::warning(format!(
                    "Could not create the data directory {} ({}). Chat history will not be saved.",
                    parent.display(),
                    e
                )));
                return Arc::new(DisabledSessionRepository::because(e));
            }
        }

        match DuckdbSessionRepository::new(&db_path, &credentials) {
            Ok(repo) => {
                debug!(
                    "Using DuckDB session storage at {:?} schema {}",
                    db_path,
                    repo.schema()
                );
                Arc::new(repo)
            }
            Err(e) => {
                info!(
                    "Failed to open document store ({}): {}. Continuing without persistence.",
                    db_path.display(),
                    e
                );
                notifier.notify(Notice::warning(format!(
                    "Could not connect to the document store ({}). Chat history will not be saved.",
                    e
                )));
                Arc::new(DisabledSessionRepository::because(e))
            }
        }
    }

    pub fn chat_use_case(&self) -> &ChatSessionUseCase {
        &self.chat_use_case
    }

    /// Spinner shown while waiting on the endpoint; notices pause it.
    pub fn spinner(&self) -> &ActiveSpinner {
        &self.spinner
    }
}

fn default_db_path(config: &ContainerConfig) -> PathBuf {
    PathBuf::from(&config.data_dir).join(DATABASE_FILE)
}

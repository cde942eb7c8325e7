use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::current_timestamp;
use crate::application::SessionRepository;
use crate::domain::{message_key, DomainError, Message, Role, SessionId};

pub const CREDENTIALS_VAR: &str = "TUNEBUDDY_STORE_CREDENTIALS";
pub const CREDENTIALS_FILE_VAR: &str = "TUNEBUDDY_STORE_CREDENTIALS_FILE";

/// Service-account style credential blob for the document store.
///
/// ```json
/// { "project_id": "tunebuddy", "database_path": "/var/lib/tunebuddy/chat.duckdb" }
/// ```
///
/// `project_id` selects the schema holding the collections; `database_path`
/// defaults to a file inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreCredentials {
    pub project_id: String,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StoreCredentials {
    pub fn from_json(blob: &str) -> Result<Self, DomainError> {
        let credentials: Self = serde_json::from_str(blob).map_err(|e| {
            DomainError::configuration(format!("Malformed store credentials: {}", e))
        })?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Reads the blob from `TUNEBUDDY_STORE_CREDENTIALS`, or from the file
    /// named by `TUNEBUDDY_STORE_CREDENTIALS_FILE`.
    pub fn from_env() -> Result<Self, DomainError> {
        if let Ok(blob) = std::env::var(CREDENTIALS_VAR) {
            if !blob.trim().is_empty() {
                return Self::from_json(&blob);
            }
        }

        match std::env::var(CREDENTIALS_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                let blob = std::fs::read_to_string(path.trim())?;
                Self::from_json(&blob)
            }
            _ => Err(DomainError::configuration(format!(
                "Neither {} nor {} is set",
                CREDENTIALS_VAR, CREDENTIALS_FILE_VAR
            ))),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        let valid = !self.project_id.is_empty()
            && self
                .project_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(DomainError::configuration(format!(
                "Invalid project_id '{}': use letters, digits, '-' or '_'",
                self.project_id
            )))
        }
    }

    pub fn database_path_or(&self, default: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| default.to_path_buf())
    }
}

/// Chat sessions stored in DuckDB as a document hierarchy: a `sessions`
/// collection and a `messages` sub-collection keyed by
/// `(session_id, doc_key)`.
///
/// Tables are always addressed as `"catalog"."schema".table`. DuckDB names
/// the catalog after the database file stem, so a bare `"schema".table` is
/// ambiguous when `project_id` equals that stem.
pub struct DuckdbSessionRepository {
    conn: Arc<Mutex<Connection>>,
    schema: String,
    /// Quoted `"catalog"."schema"` prefix.
    namespace: String,
}

impl DuckdbSessionRepository {
    pub fn new(db_path: &Path, credentials: &StoreCredentials) -> Result<Self, DomainError> {
        credentials.validate()?;
        let conn = Connection::open(db_path).map_err(|e| {
            DomainError::persistence(format!("Failed to open DuckDB database: {}", e))
        })?;
        Self::with_connection(conn, &credentials.project_id)
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::persistence(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::with_connection(conn, "main")
    }

    fn with_connection(conn: Connection, schema: &str) -> Result<Self, DomainError> {
        let catalog: String = conn
            .query_row("SELECT current_database()", [], |row| row.get(0))
            .map_err(|e| {
                DomainError::persistence(format!("Failed to read DuckDB catalog name: {}", e))
            })?;
        let namespace = format!("{}.{}", quote_identifier(&catalog), quote_identifier(schema));
        Self::initialize(&conn, &namespace)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            schema: schema.to_string(),
            namespace,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }

    fn initialize(conn: &Connection, namespace: &str) -> Result<(), DomainError> {
        debug!("Initializing DuckDB session store in {}", namespace);
        let ddl = format!(
            "\
            CREATE SCHEMA IF NOT EXISTS {namespace};

            CREATE TABLE IF NOT EXISTS {namespace}.sessions (
                id TEXT PRIMARY KEY,
                created_at BIGINT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {namespace}.messages (
                session_id TEXT NOT NULL,
                doc_key TEXT NOT NULL,
                \"position\" BIGINT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                \"timestamp\" BIGINT NOT NULL,
                PRIMARY KEY (session_id, doc_key)
            );
            "
        );

        conn.execute_batch(&ddl).map_err(|e| {
            DomainError::persistence(format!("Failed to initialize session schema: {}", e))
        })?;

        debug!("DuckDB session schema {} ready", namespace);
        Ok(())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl SessionRepository for DuckdbSessionRepository {
    async fn list_sessions(&self) -> Result<Vec<SessionId>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT id FROM {}", self.table("sessions")))
            .map_err(|e| DomainError::persistence(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::persistence(format!("Failed to query sessions: {}", e)))?;

        let mut ids = Vec::new();
        for row in rows {
            let id =
                row.map_err(|e| DomainError::persistence(format!("Failed to read row: {}", e)))?;
            ids.push(SessionId::from(id));
        }
        Ok(ids)
    }

    async fn load_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                r#"SELECT role, content, "timestamp" FROM {} WHERE session_id = ?1 ORDER BY "position""#,
                self.table("messages")
            ))
            .map_err(|e| DomainError::persistence(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![session_id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| DomainError::persistence(format!("Failed to query messages: {}", e)))?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, content, timestamp) =
                row.map_err(|e| DomainError::persistence(format!("Failed to read row: {}", e)))?;
            let role: Role = role.parse()?;
            messages.push(Message::reconstitute(role, content, Some(timestamp)));
        }
        Ok(messages)
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        position: u64,
        message: &Message,
    ) -> Result<(), DomainError> {
        let now = current_timestamp();
        let conn = self.conn.lock().await;

        conn.execute(
            &format!(
                "INSERT INTO {} (id, created_at) VALUES (?1, ?2) ON CONFLICT (id) DO NOTHING",
                self.table("sessions")
            ),
            params![session_id.as_str(), now],
        )
        .map_err(|e| DomainError::persistence(format!("Failed to save session: {}", e)))?;

        conn.execute(
            &format!(
                r#"
                INSERT INTO {} (session_id, doc_key, "position", role, content, "timestamp")
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (session_id, doc_key) DO UPDATE SET
                    "position" = excluded."position",
                    role = excluded.role,
                    content = excluded.content,
                    "timestamp" = excluded."timestamp"
                "#,
                self.table("messages")
            ),
            params![
                session_id.as_str(),
                message_key(position),
                position as i64,
                message.role().as_str(),
                message.content(),
                now,
            ],
        )
        .map_err(|e| DomainError::persistence(format!("Failed to save message: {}", e)))?;

        debug!(
            "Stored {} in session {}",
            message_key(position),
            session_id.short()
        );
        Ok(())
    }
}

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::application::RecommendationService;
use crate::domain::{DomainError, RecommendationReply, RecommendationRequest};

const CHAT_MESSAGES_PATH: &str = "/chat-messages";
const RESPONSE_MODE_BLOCKING: &str = "blocking";

pub const API_KEY_VAR: &str = "TUNEBUDDY_API_KEY";
pub const API_URL_VAR: &str = "TUNEBUDDY_API_URL";

/// Body of a Dify `chat-messages` request.
#[derive(Serialize)]
struct ApiRequest<'a> {
    inputs: serde_json::Map<String, serde_json::Value>,
    query: &'a str,
    user: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    response_mode: &'a str,
}

/// HTTP client for a Dify chat application.
///
/// Sends one blocking (non-streamed) `POST /chat-messages` per query with a
/// bearer token. Uses the transport's default timeouts; there is no retry.
///
/// ```text
/// TUNEBUDDY_API_URL=https://api.dify.ai/v1
/// TUNEBUDDY_API_KEY=app-...
/// ```
pub struct DifyClient {
    client: reqwest::Client,
    api_key: String,
    /// Full endpoint URL.
    url: String,
}

impl DifyClient {
    /// `api_url` may be the API base (`https://api.dify.ai/v1`) or the full
    /// `.../chat-messages` endpoint.
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            url: endpoint_url(&api_url.into()),
        }
    }

    /// Reads `TUNEBUDDY_API_KEY` and `TUNEBUDDY_API_URL`; both are required.
    pub fn from_env() -> Result<Self, DomainError> {
        let key = read_var(API_KEY_VAR)?;
        let url = read_var(API_URL_VAR)?;
        Ok(Self::new(key, url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn read_var(name: &str) -> Result<String, DomainError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DomainError::configuration(format!("{} is not set", name))),
    }
}

fn endpoint_url(api_url: &str) -> String {
    let trimmed = api_url.trim().trim_end_matches('/');
    if trimmed.ends_with(CHAT_MESSAGES_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{CHAT_MESSAGES_PATH}")
    }
}

#[async_trait]
impl RecommendationService for DifyClient {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationReply, DomainError> {
        let body = ApiRequest {
            inputs: serde_json::Map::new(),
            query: request.query(),
            user: request.user(),
            conversation_id: request.conversation_id(),
            response_mode: RESPONSE_MODE_BLOCKING,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::transport(format!("request to {} failed: {e}", self.url)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            info!("DifyClient: API returned {status}: {body}");
            return Err(DomainError::transport(format!("API returned {status}")));
        }

        let reply: RecommendationReply = response
            .json()
            .await
            .map_err(|e| DomainError::transport(format!("failed to parse response: {e}")))?;

        debug!(
            "DifyClient: answer present={}, conversation_id={:?}",
            reply.answer.is_some(),
            reply.conversation_id
        );
        Ok(reply)
    }

    fn backend_name(&self) -> &str {
        "dify"
    }
}

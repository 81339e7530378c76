//! HTTP client for the usuarios API
//!
//! Talks JSON over plain HTTP to a Flask-style service exposing
//! `/api/usuarios`. No authentication, pagination or partial updates.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

use crate::authority::{AuthorityResult, RecordAuthority};
use crate::error::AuthorityError;
use crate::record::{Record, RecordDraft, RecordId};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const COLLECTION_PATH: &str = "api/usuarios";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `http://localhost:5000`
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: std::env::var("ROSTER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            user_agent: std::env::var("ROSTER_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
        }
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific service
    pub fn new(base_url: &str) -> Self {
        ClientConfig {
            base_url: base_url.to_string(),
            user_agent: default_user_agent(),
        }
    }

    /// Override the User-Agent header
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// `{base}/api/usuarios`
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), COLLECTION_PATH)
    }

    /// `{base}/api/usuarios/{id}`
    pub fn record_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }
}

fn default_user_agent() -> String {
    format!("roster/{}", env!("CARGO_PKG_VERSION"))
}

/// [`RecordAuthority`] backed by the usuarios HTTP API
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl HttpAuthority {
    /// Create a new HTTP authority
    pub fn new(config: ClientConfig) -> AuthorityResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(HttpAuthority {
            config,
            http_client,
        })
    }

    /// Create an authority from environment variables
    pub fn from_env() -> AuthorityResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Turn a non-2xx response into `AuthorityError::Status`.
async fn ensure_success(response: Response) -> AuthorityResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "usuarios API rejected request");
    Err(AuthorityError::Status {
        status: status.as_u16(),
        body: truncate_body(status, body),
    })
}

fn truncate_body(status: StatusCode, body: String) -> String {
    const MAX_BODY: usize = 512;
    if body.len() <= MAX_BODY {
        return body;
    }
    let mut cut = MAX_BODY;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    debug!(status = status.as_u16(), len = body.len(), "truncating error body");
    format!("{}...", &body[..cut])
}

#[async_trait]
impl RecordAuthority for HttpAuthority {
    async fn list(&self) -> AuthorityResult<Vec<Record>> {
        let url = self.config.collection_url();
        debug!(%url, "GET");
        let response = ensure_success(self.http_client.get(&url).send().await?).await?;
        let body = response.bytes().await?;
        let records: Vec<Record> = serde_json::from_slice(&body)?;
        Ok(records)
    }

    async fn create(&self, draft: &RecordDraft) -> AuthorityResult<()> {
        let url = self.config.collection_url();
        debug!(%url, "POST");
        ensure_success(self.http_client.post(&url).json(draft).send().await?).await?;
        Ok(())
    }

    async fn update(&self, id: RecordId, draft: &RecordDraft) -> AuthorityResult<()> {
        let url = self.config.record_url(id);
        debug!(%url, "PUT");
        ensure_success(self.http_client.put(&url).json(draft).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> AuthorityResult<()> {
        let url = self.config.record_url(id);
        debug!(%url, "DELETE");
        ensure_success(self.http_client.delete(&url).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new("http://api.example.com:8080");
        assert_eq!(config.base_url, "http://api.example.com:8080");
        assert!(config.user_agent.starts_with("roster/"));
    }

    #[test]
    fn test_client_config_with_user_agent() {
        let config = ClientConfig::new("http://localhost:5000").with_user_agent("probe/1");
        assert_eq!(config.user_agent, "probe/1");
    }

    #[test]
    fn test_collection_and_record_urls() {
        let config = ClientConfig::new("http://localhost:5000");
        assert_eq!(config.collection_url(), "http://localhost:5000/api/usuarios");
        assert_eq!(
            config.record_url(RecordId(42)),
            "http://localhost:5000/api/usuarios/42"
        );
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let config = ClientConfig::new("http://localhost:5000/");
        assert_eq!(config.collection_url(), "http://localhost:5000/api/usuarios");
    }

    #[test]
    fn test_truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body(StatusCode::BAD_REQUEST, "nope".into()), "nope");
        let long = "é".repeat(400);
        let cut = truncate_body(StatusCode::BAD_REQUEST, long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 515);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let authority = HttpAuthority::new(ClientConfig::new("http://127.0.0.1:9")).unwrap();
        let err = authority.list().await.unwrap_err();
        assert!(matches!(err, AuthorityError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}

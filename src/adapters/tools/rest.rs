//! REST tool repository.
//!
//! Talks to a PostgREST-style table endpoint (`/rest/v1/{table}`):
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list_all  | `GET ?select=*&order={column}.asc` |
//! | insert    | `POST` body = fields, `Prefer: return=representation` |
//! | update    | `PATCH ?id=eq.{id}` body = patch, `Prefer: return=representation` |
//! | delete    | `DELETE ?id=eq.{id}`, `Prefer: return=representation` |
//!
//! An empty representation from update/delete means no row matched.
//!
//! # Security
//!
//! - The API key is held in `secrecy::SecretString` and only exposed when
//!   building request headers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::ToolId;
use crate::domain::tool::{NewTool, Tool, ToolPatch};
use crate::ports::{RepositoryError, ToolRepository};

/// REST endpoint configuration.
#[derive(Clone)]
pub struct RestToolConfig {
    /// Project base URL, e.g. `https://xyz.example.co`.
    base_url: String,

    /// Anonymous/service API key.
    api_key: SecretString,

    /// Table name.
    table: String,

    /// Column used to keep insertion order on select.
    order_by: Option<String>,

    /// Request timeout.
    timeout: Duration,
}

impl RestToolConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into()),
            table: "tools".to_string(),
            order_by: Some("created_at".to_string()),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// `None` leaves ordering to the endpoint.
    pub fn with_order_by(mut self, column: Option<String>) -> Self {
        self.order_by = column;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Error body returned by the endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP adapter for the tool table.
pub struct RestToolRepository {
    config: RestToolConfig,
    client: Client,
}

impl RestToolRepository {
    pub fn new(config: RestToolConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepositoryError::unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.config.api_key.expose_secret();
        builder
            .header("apikey", key.as_str())
            .bearer_auth(key)
    }

    fn returning(&self, builder: RequestBuilder) -> RequestBuilder {
        self.authorized(builder)
            .header("Prefer", "return=representation")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RepositoryError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Tool endpoint request failed: {}", e);
            RepositoryError::unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Tool endpoint rejected request");
        Err(rejection(status.as_u16(), &body))
    }

    async fn rows(&self, response: Response) -> Result<Vec<Tool>, RepositoryError> {
        response
            .json::<Vec<Tool>>()
            .await
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

fn rejection(status: u16, body: &str) -> RepositoryError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.trim().to_string());
    RepositoryError::rejected(status, message)
}

fn id_filter(id: &ToolId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl ToolRepository for RestToolRepository {
    async fn list_all(&self) -> Result<Vec<Tool>, RepositoryError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(column) = &self.config.order_by {
            query.push(("order", format!("{}.asc", column)));
        }

        let request = self.authorized(self.client.get(self.table_url()).query(&query));
        let response = self.send(request).await?;
        let tools = self.rows(response).await?;
        tracing::debug!(count = tools.len(), "Fetched tools");
        Ok(tools)
    }

    async fn insert(&self, fields: &NewTool) -> Result<Tool, RepositoryError> {
        let request = self.returning(self.client.post(self.table_url()).json(fields));
        let response = self.send(request).await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Decode("insert returned no row".to_string()))
    }

    async fn update(&self, id: &ToolId, patch: &ToolPatch) -> Result<(), RepositoryError> {
        let request = self.returning(
            self.client
                .patch(self.table_url())
                .query(&id_filter(id))
                .json(patch),
        );
        let response = self.send(request).await?;
        if self.rows(response).await?.is_empty() {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &ToolId) -> Result<(), RepositoryError> {
        let request = self.returning(self.client.delete(self.table_url()).query(&id_filter(id)));
        let response = self.send(request).await?;
        if self.rows(response).await?.is_empty() {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::serve;

    const ROW: &str =
        r#"[{"id":"t-1","name":"Search","description":"Finds","url":"https://s.example","created_at":"2024-01-01T00:00:00Z"}]"#;

    fn repo(base_url: &str) -> RestToolRepository {
        RestToolRepository::new(RestToolConfig::new(base_url, "anon-key")).unwrap()
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        let repo = RestToolRepository::new(
            RestToolConfig::new("https://db.example/", "k").with_table("links"),
        )
        .unwrap();
        assert_eq!(repo.table_url(), "https://db.example/rest/v1/links");
    }

    #[test]
    fn rejection_prefers_message_field() {
        let err = rejection(400, r#"{"message":"column missing","code":"42703"}"#);
        assert_eq!(err, RepositoryError::rejected(400, "column missing"));

        let err = rejection(502, "bad gateway");
        assert_eq!(err, RepositoryError::rejected(502, "bad gateway"));
    }

    #[tokio::test]
    async fn list_all_sends_select_order_and_keys() {
        let (url, requests) = serve(vec![(200, ROW)]).await;

        let tools = repo(&url).list_all().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "Search");

        let raw = requests.await.unwrap().remove(0);
        assert!(raw.starts_with("GET /rest/v1/tools?select=*&order=created_at.asc"));
        assert!(raw.to_lowercase().contains("apikey: anon-key"));
        assert!(raw.contains("Bearer anon-key"));
    }

    #[tokio::test]
    async fn insert_posts_fields_and_returns_row() {
        let (url, requests) = serve(vec![(201, ROW)]).await;
        let fields = NewTool::new("Search", "Finds", "https://s.example").unwrap();

        let tool = repo(&url).insert(&fields).await.unwrap();
        assert_eq!(tool.id.as_str(), "t-1");

        let raw = requests.await.unwrap().remove(0);
        assert!(raw.starts_with("POST /rest/v1/tools"));
        assert!(raw.to_lowercase().contains("prefer: return=representation"));
        assert!(raw.contains(r#""url":"https://s.example""#));
    }

    #[tokio::test]
    async fn update_filters_by_id_and_sends_only_patch_fields() {
        let (url, requests) = serve(vec![(200, ROW)]).await;
        let id = ToolId::new("t-1").unwrap();

        repo(&url)
            .update(&id, &ToolPatch::new().with_name("Z"))
            .await
            .unwrap();

        let raw = requests.await.unwrap().remove(0);
        assert!(raw.starts_with("PATCH /rest/v1/tools?id=eq.t-1"));
        assert!(raw.ends_with(r#"{"name":"Z"}"#));
    }

    #[tokio::test]
    async fn empty_representation_is_not_found() {
        let (url, _requests) = serve(vec![(200, "[]"), (200, "[]")]).await;
        let repo = repo(&url);
        let id = ToolId::new("ghost").unwrap();

        let update = repo.update(&id, &ToolPatch::new().with_name("Z")).await;
        assert!(matches!(update, Err(RepositoryError::NotFound(_))));

        let delete = repo.delete(&id).await;
        assert!(matches!(delete, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn error_status_maps_to_rejected() {
        let (url, _requests) = serve(vec![(401, r#"{"message":"JWT expired"}"#)]).await;

        let result = repo(&url).list_all().await;
        assert_eq!(result, Err(RepositoryError::rejected(401, "JWT expired")));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = repo(&format!("http://{}", addr)).list_all().await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }
}

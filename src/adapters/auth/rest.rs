//! REST identity backend.
//!
//! Speaks the password-grant flow of a GoTrue-style auth service:
//!
//! - `POST /auth/v1/token?grant_type=password` - sign in
//! - `GET /auth/v1/user` - resolve the current access token
//! - `POST /auth/v1/logout` - revoke the access token
//!
//! When given a `LocalStorage`, the access token is persisted under
//! `auth_token` so an identity session survives restarts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthBackend, LocalStorage, SessionChange, AUTH_TOKEN_KEY};

/// Auth service configuration.
#[derive(Clone)]
pub struct RestAuthConfig {
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
}

impl RestAuthConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into()),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    email_confirmed_at: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
}

impl UserResponse {
    fn into_user(self) -> Result<AuthenticatedUser, AuthError> {
        let id = UserId::new(self.id)
            .map_err(|_| AuthError::service_unavailable("auth response without user id"))?;
        Ok(AuthenticatedUser::new(
            id,
            self.email.unwrap_or_default(),
            self.user_metadata.full_name.or(self.user_metadata.name),
            self.email_confirmed_at.is_some(),
        ))
    }
}

/// HTTP identity backend.
pub struct RestAuthBackend {
    config: RestAuthConfig,
    client: Client,
    token: RwLock<Option<SecretString>>,
    token_storage: Option<Arc<dyn LocalStorage>>,
    changes: broadcast::Sender<SessionChange>,
}

impl RestAuthBackend {
    pub fn new(config: RestAuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;
        let (changes, _) = broadcast::channel(16);
        Ok(Self {
            config,
            client,
            token: RwLock::new(None),
            token_storage: None,
            changes,
        })
    }

    /// Persist the access token in `storage`, restoring any token already
    /// there.
    pub fn with_token_storage(mut self, storage: Arc<dyn LocalStorage>) -> Self {
        let restored = match storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read persisted auth token: {}", e);
                None
            }
        };
        self.token = RwLock::new(restored.map(SecretString::new));
        self.token_storage = Some(storage);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn keyed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", self.config.api_key.expose_secret().as_str())
    }

    async fn set_token(&self, token: Option<String>) {
        if let Some(storage) = &self.token_storage {
            let result = match &token {
                Some(t) => storage.set(AUTH_TOKEN_KEY, t),
                None => storage.remove(AUTH_TOKEN_KEY),
            };
            if let Err(e) = result {
                tracing::warn!("Could not persist auth token: {}", e);
            }
        }
        *self.token.write().await = token.map(SecretString::new);
    }

    async fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| t.expose_secret().clone())
    }
}

fn transport(e: reqwest::Error) -> AuthError {
    tracing::warn!("Auth service request failed: {}", e);
    AuthError::service_unavailable(e.to_string())
}

#[async_trait]
impl AuthBackend for RestAuthBackend {
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, AuthError> {
        let body = PasswordGrant {
            email,
            password: password.expose_secret(),
        };
        let response = self
            .keyed(self.client.post(self.endpoint("token")))
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::service_unavailable(format!(
                "auth service returned {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("bad token response: {}", e)))?;
        let user = token.user.into_user()?;

        self.set_token(Some(token.access_token)).await;
        tracing::info!(user_id = %user.id, "Signed in");
        let _ = self.changes.send(SessionChange::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(token) = self.bearer().await else {
            return Ok(());
        };

        let result = self
            .keyed(self.client.post(self.endpoint("logout")))
            .bearer_auth(token)
            .send()
            .await;
        match result {
            Ok(r) if !r.status().is_success() && r.status() != StatusCode::UNAUTHORIZED => {
                tracing::warn!(status = r.status().as_u16(), "Remote logout failed");
            }
            Err(e) => tracing::warn!("Remote logout failed: {}", e),
            Ok(_) => {}
        }

        // local session ends regardless of the remote outcome
        self.set_token(None).await;
        let _ = self.changes.send(SessionChange::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthenticatedUser>, AuthError> {
        let Some(token) = self.bearer().await else {
            return Ok(None);
        };

        let response = self
            .keyed(self.client.get(self.endpoint("user")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::info!("Stored auth token no longer valid");
            self.set_token(None).await;
            let _ = self.changes.send(SessionChange::SignedOut);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::service_unavailable(format!(
                "auth service returned {}",
                status
            )));
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("bad user response: {}", e)))?;
        Ok(Some(user.into_user()?))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryLocalStorage;
    use crate::adapters::test_support::serve;

    const TOKEN_BODY: &str = r#"{"access_token":"tok-1","token_type":"bearer","refresh_token":"r","user":{"id":"u-1","email":"ops@admin.example.com","email_confirmed_at":"2024-01-01T00:00:00Z","user_metadata":{"full_name":"Ops"}}}"#;
    const USER_BODY: &str = r#"{"id":"u-1","email":"ops@admin.example.com","user_metadata":{}}"#;

    fn pw(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    fn backend(url: &str) -> RestAuthBackend {
        RestAuthBackend::new(RestAuthConfig::new(url, "anon")).unwrap()
    }

    #[tokio::test]
    async fn sign_in_maps_user_and_persists_token() {
        let (url, requests) = serve(vec![(200, TOKEN_BODY)]).await;
        let storage = Arc::new(InMemoryLocalStorage::new());
        let backend = backend(&url).with_token_storage(storage.clone());
        let mut rx = backend.subscribe();

        let user = backend
            .sign_in("ops@admin.example.com", &pw("pw"))
            .await
            .unwrap();

        assert_eq!(user.id.as_str(), "u-1");
        assert_eq!(user.display_name.as_deref(), Some("Ops"));
        assert!(user.email_verified);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(matches!(rx.recv().await.unwrap(), SessionChange::SignedIn(_)));

        let raw = requests.await.unwrap().remove(0);
        assert!(raw.starts_with("POST /auth/v1/token?grant_type=password"));
        assert!(raw.to_lowercase().contains("apikey: anon"));
    }

    #[tokio::test]
    async fn rejected_credentials_are_invalid() {
        let (url, _requests) = serve(vec![(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )])
        .await;

        let result = backend(&url).sign_in("x@y.z", &pw("bad")).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn server_error_is_service_unavailable() {
        let (url, _requests) = serve(vec![(503, "{}")]).await;
        let result = backend(&url).sign_in("x@y.z", &pw("pw")).await;
        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn current_user_without_token_skips_network() {
        let backend = backend("http://127.0.0.1:9");
        assert_eq!(backend.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn restored_token_resolves_current_user() {
        let (url, requests) = serve(vec![(200, USER_BODY)]).await;
        let storage = Arc::new(InMemoryLocalStorage::new().with_entry(AUTH_TOKEN_KEY, "tok-9"));
        let backend = backend(&url).with_token_storage(storage);

        let user = backend.current_user().await.unwrap().unwrap();
        assert_eq!(user.email, "ops@admin.example.com");
        assert!(!user.email_verified);

        let raw = requests.await.unwrap().remove(0);
        assert!(raw.starts_with("GET /auth/v1/user"));
        assert!(raw.contains("Bearer tok-9"));
    }

    #[tokio::test]
    async fn expired_token_is_cleared() {
        let (url, _requests) = serve(vec![(401, r#"{"msg":"expired"}"#)]).await;
        let storage = Arc::new(InMemoryLocalStorage::new().with_entry(AUTH_TOKEN_KEY, "old"));
        let backend = backend(&url).with_token_storage(storage.clone());

        assert_eq!(backend.current_user().await.unwrap(), None);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_clears_token_even_if_remote_fails() {
        let (url, _requests) = serve(vec![(500, "{}")]).await;
        let storage = Arc::new(InMemoryLocalStorage::new().with_entry(AUTH_TOKEN_KEY, "tok"));
        let backend = backend(&url).with_token_storage(storage.clone());

        backend.sign_out().await.unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);

        // second call has no token and makes no request
        backend.sign_out().await.unwrap();
    }
}

//! AppContext - the explicitly owned wiring of one application instance.
//!
//! Presentation code receives an `AppContext` (or clones of its `Arc`s)
//! instead of reaching for process-wide providers. Dropping the context
//! stops its background reconciliation task.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::session::{AdminPolicy, SessionManager};
use super::tools::ToolStore;
use crate::adapters::auth::{RestAuthBackend, RestAuthConfig};
use crate::adapters::notify::TracingNotifier;
use crate::adapters::storage::FileLocalStorage;
use crate::adapters::tools::{LocalToolRepository, RestToolConfig, RestToolRepository};
use crate::config::{AppConfig, AuthPolicyKind};
use crate::domain::foundation::AuthError;
use crate::ports::{LocalStorage, Notifier, RepositoryError, StorageError, ToolRepository};

/// Failures while wiring adapters from configuration.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Local storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Tool endpoint: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Identity backend: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration incomplete: {0}")]
    Incomplete(&'static str),
}

/// Session manager and tool store for one application instance.
pub struct AppContext {
    session: Arc<SessionManager>,
    tools: Arc<ToolStore>,
    reconciliation: Option<JoinHandle<()>>,
}

impl AppContext {
    pub fn new(session: Arc<SessionManager>, tools: Arc<ToolStore>) -> Self {
        Self {
            session,
            tools,
            reconciliation: None,
        }
    }

    /// Builds every adapter named by `config`.
    ///
    /// The tool store talks to the REST endpoint when one is configured and
    /// falls back to local storage otherwise. Does not contact any remote
    /// service; call `start` and `ToolStore::load` for that.
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileLocalStorage::open(&config.storage.path)?);
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());

        let policy = admin_policy(config, &storage)?;
        let repository = tool_repository(config, &storage)?;

        tracing::info!(
            policy = policy.name(),
            offline = config.store.is_offline(),
            consistency = ?config.store.consistency,
            "Application context wired"
        );

        let session = SessionManager::restore(policy, storage, notifier.clone());
        let tools = ToolStore::new(repository, notifier, config.store.consistency);
        Ok(Self::new(Arc::new(session), Arc::new(tools)))
    }

    /// Reconciles the restored session with the identity backend and starts
    /// following its changes. Calling it again is a no-op.
    pub async fn start(&mut self) {
        if self.reconciliation.is_none() {
            self.reconciliation = self.session.start_reconciliation().await;
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn tools(&self) -> &Arc<ToolStore> {
        &self.tools
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        if let Some(task) = self.reconciliation.take() {
            task.abort();
        }
    }
}

fn admin_policy(
    config: &AppConfig,
    storage: &Arc<dyn LocalStorage>,
) -> Result<AdminPolicy, ContextError> {
    let auth = &config.auth;
    match auth.policy {
        AuthPolicyKind::SharedSecret => Ok(AdminPolicy::SharedSecret {
            user_secret: auth.user_password.clone(),
            admin_secret: auth.admin_password.clone(),
        }),
        AuthPolicyKind::Identity => {
            let url = auth
                .backend_url
                .as_deref()
                .ok_or(ContextError::Incomplete("auth.backend_url"))?;
            let key = auth
                .api_key
                .as_ref()
                .ok_or(ContextError::Incomplete("auth.api_key"))?;
            let suffix = auth
                .admin_email_suffix
                .clone()
                .ok_or(ContextError::Incomplete("auth.admin_email_suffix"))?;

            let backend = RestAuthBackend::new(
                RestAuthConfig::new(url, key.expose_secret().clone())
                    .with_timeout(auth.request_timeout()),
            )?
            .with_token_storage(storage.clone());
            Ok(AdminPolicy::identity(Arc::new(backend), suffix))
        }
    }
}

fn tool_repository(
    config: &AppConfig,
    storage: &Arc<dyn LocalStorage>,
) -> Result<Arc<dyn ToolRepository>, ContextError> {
    let store = &config.store;
    let Some(url) = store.endpoint_url.as_deref().filter(|u| !u.is_empty()) else {
        return Ok(Arc::new(LocalToolRepository::new(storage.clone())));
    };
    let key = store
        .api_key
        .as_ref()
        .ok_or(ContextError::Incomplete("store.api_key"))?;

    let repository = RestToolRepository::new(
        RestToolConfig::new(url, key.expose_secret().clone())
            .with_table(store.table.clone())
            .with_order_by(store.order_by().map(str::to_string))
            .with_timeout(store.request_timeout()),
    )?;
    Ok(Arc::new(repository))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Credential;
    use crate::domain::tool::ToolDraft;

    fn offline_config(dir: &tempfile::TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.path = dir.path().join("storage.json");
        config
    }

    #[tokio::test]
    async fn offline_context_persists_session_and_tools() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(&dir);

        {
            let ctx = AppContext::from_config(&config).unwrap();
            assert!(ctx.session().admin_login(&Credential::password("admin")).await);
            ctx.tools()
                .create(ToolDraft::new("Search", "Finds things", "https://search.example"))
                .await
                .unwrap();
        }

        let ctx = AppContext::from_config(&config).unwrap();
        assert!(ctx.session().is_admin());
        ctx.tools().load().await.unwrap();
        assert_eq!(ctx.tools().list()[0].name, "Search");
    }

    #[tokio::test]
    async fn start_is_a_no_op_for_shared_secret() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = AppContext::from_config(&offline_config(&dir)).unwrap();
        ctx.start().await;
        assert!(ctx.reconciliation.is_none());
    }

    #[test]
    fn identity_without_backend_url_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(&dir);
        config.auth.policy = AuthPolicyKind::Identity;

        let err = AppContext::from_config(&config).err().unwrap();
        assert!(matches!(err, ContextError::Incomplete("auth.backend_url")));
    }

    #[test]
    fn remote_store_without_key_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(&dir);
        config.store.endpoint_url = Some("https://db.example.co".to_string());

        let err = AppContext::from_config(&config).err().unwrap();
        assert!(matches!(err, ContextError::Incomplete("store.api_key")));
    }
}

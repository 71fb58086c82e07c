//! SessionManager - authenticated/admin status with durable flags.
//!
//! State lives in a `watch` channel so presentation code can both read a
//! snapshot and await changes. Every flag change is written to
//! `LocalStorage` before the call returns, which is what lets `restore`
//! rebuild the session after a restart without asking the backend.

use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::policy::{secrets_match, AdminPolicy};
use crate::domain::foundation::{AuthError, AuthenticatedUser, Notice};
use crate::domain::session::{Credential, SessionState};
use crate::ports::{LocalStorage, Notifier, SessionChange, ADMIN_KEY, AUTHENTICATED_KEY};

const USER_WELCOME: &str = "You have successfully logged in.";
const ADMIN_WELCOME: &str = "Welcome back, admin!";

/// Owns the session for one application instance.
pub struct SessionManager {
    policy: AdminPolicy,
    storage: Arc<dyn LocalStorage>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Rebuilds the session from persisted flags. Never contacts the
    /// identity backend; call `reconcile` for that.
    pub fn restore(
        policy: AdminPolicy,
        storage: Arc<dyn LocalStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let authenticated = storage.flag(AUTHENTICATED_KEY);
        let mut admin = storage.flag(ADMIN_KEY);

        if policy.is_identity() && admin && !authenticated {
            tracing::warn!("Persisted admin flag without authentication; dropping it");
            admin = false;
        }

        tracing::debug!(
            policy = policy.name(),
            authenticated,
            admin,
            "Session restored"
        );

        let (state, _) = watch::channel(SessionState::from_flags(authenticated, admin));
        let manager = Self {
            policy,
            storage,
            notifier,
            state,
        };
        if manager.policy.is_identity() && manager.storage.flag(ADMIN_KEY) != admin {
            manager.persist_flag(ADMIN_KEY, admin);
        }
        manager
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn identity(&self) -> Option<AuthenticatedUser> {
        self.state.borrow().identity().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        self.state.borrow().require_admin()
    }

    /// User-view login. Returns whether the credential was accepted.
    pub async fn login(&self, credential: &Credential) -> bool {
        match &self.policy {
            AdminPolicy::SharedSecret { user_secret, .. } => {
                if !secrets_match(credential.secret(), user_secret) {
                    self.reject(AuthError::InvalidCredentials);
                    return false;
                }
                self.state.send_modify(|s| s.set_authenticated(true));
                self.persist_flag(AUTHENTICATED_KEY, true);
            }
            AdminPolicy::Identity { backend, .. } => {
                let Some(email) = credential.email() else {
                    self.reject(AuthError::MissingEmail);
                    return false;
                };
                let user = match backend.sign_in(email, credential.secret()).await {
                    Ok(user) => user,
                    Err(e) => {
                        self.reject(e);
                        return false;
                    }
                };
                self.apply_identity(Some(user));
            }
        }

        tracing::info!(policy = self.policy.name(), "User logged in");
        self.notifier
            .notify(Notice::success("Login successful", USER_WELCOME));
        true
    }

    /// Admin login. A rejected credential leaves the session untouched.
    pub async fn admin_login(&self, credential: &Credential) -> bool {
        match &self.policy {
            AdminPolicy::SharedSecret { admin_secret, .. } => {
                if !secrets_match(credential.secret(), admin_secret) {
                    self.reject(AuthError::InvalidCredentials);
                    return false;
                }
                self.state.send_modify(|s| s.set_admin(true));
                self.persist_flag(ADMIN_KEY, true);
            }
            AdminPolicy::Identity { backend, .. } => {
                let Some(email) = credential.email() else {
                    self.reject(AuthError::MissingEmail);
                    return false;
                };
                if !self.policy.grants_admin(email) {
                    self.reject(AuthError::InsufficientPermissions);
                    return false;
                }
                let user = match backend.sign_in(email, credential.secret()).await {
                    Ok(user) => user,
                    Err(e) => {
                        self.reject(e);
                        return false;
                    }
                };
                // backend may normalize the address
                if !self.policy.grants_admin(&user.email) {
                    if let Err(e) = backend.sign_out().await {
                        tracing::warn!("Sign-out of non-admin identity failed: {}", e);
                    }
                    self.reject(AuthError::InsufficientPermissions);
                    return false;
                }
                self.apply_identity(Some(user));
            }
        }

        tracing::info!(policy = self.policy.name(), "Admin logged in");
        self.notifier
            .notify(Notice::success("Admin login successful", ADMIN_WELCOME));
        true
    }

    /// Ends the user session. Idempotent.
    pub async fn logout(&self) {
        match &self.policy {
            AdminPolicy::SharedSecret { .. } => {
                self.state.send_modify(|s| s.set_authenticated(false));
                self.persist_flag(AUTHENTICATED_KEY, false);
            }
            AdminPolicy::Identity { .. } => self.sign_out().await,
        }
        tracing::info!("User logged out");
    }

    /// Ends the admin session. Under the identity policy this is a full
    /// sign-out. Idempotent.
    pub async fn admin_logout(&self) {
        match &self.policy {
            AdminPolicy::SharedSecret { .. } => {
                self.state.send_modify(|s| s.set_admin(false));
                self.persist_flag(ADMIN_KEY, false);
            }
            AdminPolicy::Identity { .. } => self.sign_out().await,
        }
        tracing::info!("Admin logged out");
    }

    /// Overwrites local state with the backend's view of the session.
    /// No-op under the shared-secret policy. On backend failure the local
    /// state is kept.
    pub async fn reconcile(&self) {
        let Some(backend) = self.policy.backend() else {
            return;
        };
        match backend.current_user().await {
            Ok(user) => self.apply_identity(user),
            Err(e) => tracing::warn!("Session reconciliation failed: {}", e),
        }
    }

    /// Reconciles once, then spawns a task that follows backend session
    /// changes until the manager is dropped or the backend goes away. The
    /// state is current when this returns.
    ///
    /// Returns `None` under the shared-secret policy.
    pub async fn start_reconciliation(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let backend = self.policy.backend()?;
        // subscribe first so no change slips in between
        let changes = backend.subscribe();
        self.reconcile().await;
        let manager = Arc::downgrade(self);
        Some(tokio::spawn(follow_changes(manager, changes)))
    }

    async fn sign_out(&self) {
        if let Some(backend) = self.policy.backend() {
            if let Err(e) = backend.sign_out().await {
                tracing::warn!("Backend sign-out failed: {}", e);
                self.notifier.notify(Notice::warning(
                    "Sign-out incomplete",
                    format!("Signed out locally; the server reported: {}", e),
                ));
            }
        }
        self.apply_identity(None);
    }

    fn apply_change(&self, change: SessionChange) {
        match change {
            SessionChange::SignedIn(user) => self.apply_identity(Some(user)),
            SessionChange::SignedOut => self.apply_identity(None),
        }
    }

    fn apply_identity(&self, user: Option<AuthenticatedUser>) {
        let next = match user {
            Some(user) => {
                let admin = self.policy.grants_admin(&user.email);
                SessionState::with_identity(user, admin)
            }
            None => SessionState::signed_out(),
        };
        let (authenticated, admin) = (next.is_authenticated(), next.is_admin());
        self.state.send_replace(next);
        self.persist_flag(AUTHENTICATED_KEY, authenticated);
        self.persist_flag(ADMIN_KEY, admin);
    }

    fn persist_flag(&self, key: &str, value: bool) {
        let result = if value {
            self.storage.set(key, "true")
        } else {
            self.storage.remove(key)
        };
        if let Err(e) = result {
            tracing::warn!(key, "Could not persist session flag: {}", e);
            self.notifier.notify(Notice::warning(
                "Session not saved",
                "Your login status could not be saved and may be lost on restart.",
            ));
        }
    }

    fn reject(&self, error: AuthError) {
        if error.is_transient() {
            tracing::warn!(code = %error.code(), "Login failed: {}", error);
        } else {
            tracing::info!(code = %error.code(), "Login rejected");
        }
        self.notifier.notify(Notice::error("Error", error.to_string()));
    }
}

async fn follow_changes(manager: Weak<SessionManager>, mut changes: broadcast::Receiver<SessionChange>) {
    loop {
        let next = changes.recv().await;
        let Some(m) = manager.upgrade() else {
            break;
        };
        match next {
            Ok(change) => m.apply_change(change),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Missed session changes; reconciling");
                m.reconcile().await;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::debug!("Session reconciliation stopped");
}

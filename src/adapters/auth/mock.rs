//! Mock authentication backend for testing.
//!
//! Implements the `AuthBackend` port without a real identity service.
//!
//! # Example
//!
//! ```ignore
//! use tool_directory::adapters::auth::MockAuthBackend;
//!
//! let backend = MockAuthBackend::new()
//!     .with_account("ops@admin.example.com", "s3cret")
//!     .with_account("reader@example.com", "pw");
//!
//! let user = backend.sign_in("reader@example.com", &SecretString::new("pw".into())).await?;
//! ```
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned. Test use only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthBackend, SessionChange};

/// Registered account: password plus the identity it yields.
#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthenticatedUser,
}

/// Mock identity backend.
///
/// Accounts are keyed by lower-cased email. Unknown emails and wrong
/// passwords both return `InvalidCredentials`.
#[derive(Debug)]
pub struct MockAuthBackend {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<AuthenticatedUser>>,
    /// Optional error to return for all calls (for error testing)
    force_error: RwLock<Option<AuthError>>,
    changes: broadcast::Sender<SessionChange>,
    sign_in_calls: AtomicUsize,
    current_user_calls: AtomicUsize,
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthBackend {
    /// Creates a backend with no accounts and no session.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            force_error: RwLock::new(None),
            changes,
            sign_in_calls: AtomicUsize::new(0),
            current_user_calls: AtomicUsize::new(0),
        }
    }

    /// Registers an account whose user id is derived from the email.
    pub fn with_account(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into();
        let local = email.split('@').next().unwrap_or(&email).to_string();
        let user = AuthenticatedUser::new(
            UserId::new(format!("user-{}", local)).expect("non-empty user id"),
            email,
            Some(local),
            true,
        );
        self.with_user(password, user)
    }

    /// Registers an account for a fully specified user.
    pub fn with_user(self, password: impl Into<String>, user: AuthenticatedUser) -> Self {
        let login = user.email.clone();
        self.with_login(login, password, user)
    }

    /// Registers `user` under a login email that may differ from the
    /// email the backend reports (aliases, normalization).
    pub fn with_login(
        self,
        login: impl Into<String>,
        password: impl Into<String>,
        user: AuthenticatedUser,
    ) -> Self {
        self.accounts.write().unwrap().insert(
            login.into().to_ascii_lowercase(),
            Account {
                password: password.into(),
                user,
            },
        );
        self
    }

    /// Starts with an existing backend session (e.g. restored by the
    /// backend's own persistence).
    pub fn with_session(self, user: AuthenticatedUser) -> Self {
        *self.current.write().unwrap() = Some(user);
        self
    }

    /// Forces all calls to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    /// Simulates the backend ending the session on its own (expiry,
    /// sign-out from another tab).
    pub fn expire_session(&self) {
        *self.current.write().unwrap() = None;
        let _ = self.changes.send(SessionChange::SignedOut);
    }

    /// Simulates a sign-in that happened elsewhere.
    pub fn announce_sign_in(&self, user: AuthenticatedUser) {
        *self.current.write().unwrap() = Some(user.clone());
        let _ = self.changes.send(SessionChange::SignedIn(user));
    }

    /// How many times `sign_in` was called.
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    /// How many times `current_user` was called.
    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    /// The backend's current session.
    pub fn current(&self) -> Option<AuthenticatedUser> {
        self.current.read().unwrap().clone()
    }

    fn forced(&self) -> Result<(), AuthError> {
        match self.force_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.forced()?;

        let account = self
            .accounts
            .read()
            .unwrap()
            .get(&email.trim().to_ascii_lowercase())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if account.password != *password.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }

        *self.current.write().unwrap() = Some(account.user.clone());
        let _ = self.changes.send(SessionChange::SignedIn(account.user.clone()));
        Ok(account.user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.forced()?;
        let had_session = self.current.write().unwrap().take().is_some();
        if had_session {
            let _ = self.changes.send(SessionChange::SignedOut);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthenticatedUser>, AuthError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        self.forced()?;
        Ok(self.current())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}

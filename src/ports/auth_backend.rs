//! Authentication backend port.
//!
//! Used by the identity admin policy. The backend establishes durable
//! sessions from an email + password credential and announces session
//! changes (sign-in elsewhere, expiry, sign-out) on a broadcast channel so
//! the session manager can reconcile its locally restored flags.
//!
//! The shared-secret policy has no backend at all.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::broadcast;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Asynchronous session-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(AuthenticatedUser),
    SignedOut,
}

/// Identity backend.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidCredentials` for a rejected credential
/// - Return `AuthError::ServiceUnavailable` for transient errors
/// - Treat `sign_out` without a session as success
/// - Broadcast a `SessionChange` after every state change they make
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Establish a session for `email`.
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, AuthError>;

    /// Drop the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The identity of the current session, if any.
    async fn current_user(&self) -> Result<Option<AuthenticatedUser>, AuthError>;

    /// Subscribe to session-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

//! Session snapshot and access guards.

use serde::Serialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Authenticated/admin status as seen by presentation code.
///
/// Under the shared-secret policy `admin` is tracked independently of
/// `authenticated`; under the identity policy `admin` implies
/// `authenticated`. `identity` is set by a sign-in or a reconciliation, so a
/// session restored from storage is `authenticated` without an identity
/// until the backend has been asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    authenticated: bool,
    admin: bool,
    identity: Option<AuthenticatedUser>,
}

impl SessionState {
    /// Flags only, no identity (shared-secret policy, restored state).
    pub fn from_flags(authenticated: bool, admin: bool) -> Self {
        Self {
            authenticated,
            admin,
            identity: None,
        }
    }

    /// Identity-backed session; `admin` is decided by the caller's policy.
    pub fn with_identity(identity: AuthenticatedUser, admin: bool) -> Self {
        Self {
            authenticated: true,
            admin,
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn identity(&self) -> Option<&AuthenticatedUser> {
        self.identity.as_ref()
    }

    pub(crate) fn set_authenticated(&mut self, value: bool) {
        self.authenticated = value;
    }

    pub(crate) fn set_admin(&mut self, value: bool) {
        self.admin = value;
    }

    /// The tool list is visible to users and admins alike.
    pub fn can_view_tools(&self) -> bool {
        self.authenticated || self.admin
    }

    /// Only admins reach the CRUD panel.
    pub fn can_manage_tools(&self) -> bool {
        self.admin
    }

    pub fn require_authenticated(&self) -> Result<(), AuthError> {
        if self.can_view_tools() {
            Ok(())
        } else {
            Err(AuthError::NotSignedIn)
        }
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.can_manage_tools() {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

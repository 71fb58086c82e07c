//! Admin-status policies.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::foundation::email_has_suffix;
use crate::ports::AuthBackend;

/// Default user-view password.
pub const DEFAULT_USER_SECRET: &str = "arora";

/// Default admin password.
pub const DEFAULT_ADMIN_SECRET: &str = "admin";

/// How a credential is checked and how admin status is decided.
#[derive(Clone)]
pub enum AdminPolicy {
    /// Two configured secrets, one per role. Admin is tracked
    /// independently of the authenticated flag.
    SharedSecret {
        user_secret: SecretString,
        admin_secret: SecretString,
    },

    /// Email/password against an identity backend. Admin is derived from
    /// the signed-in email and implies authenticated.
    Identity {
        backend: Arc<dyn AuthBackend>,
        admin_email_suffix: String,
    },
}

impl AdminPolicy {
    pub fn shared_secret(user_secret: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self::SharedSecret {
            user_secret: SecretString::new(user_secret.into()),
            admin_secret: SecretString::new(admin_secret.into()),
        }
    }

    pub fn identity(backend: Arc<dyn AuthBackend>, admin_email_suffix: impl Into<String>) -> Self {
        Self::Identity {
            backend,
            admin_email_suffix: admin_email_suffix.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SharedSecret { .. } => "shared_secret",
            Self::Identity { .. } => "identity",
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity { .. })
    }

    pub(crate) fn backend(&self) -> Option<&Arc<dyn AuthBackend>> {
        match self {
            Self::Identity { backend, .. } => Some(backend),
            Self::SharedSecret { .. } => None,
        }
    }

    /// Whether `email` would be granted admin under the identity policy.
    /// Always false for the shared-secret policy.
    pub fn grants_admin(&self, email: &str) -> bool {
        match self {
            Self::Identity {
                admin_email_suffix, ..
            } => email_has_suffix(email, admin_email_suffix),
            Self::SharedSecret { .. } => false,
        }
    }
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::shared_secret(DEFAULT_USER_SECRET, DEFAULT_ADMIN_SECRET)
    }
}

impl fmt::Debug for AdminPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedSecret { .. } => f
                .debug_struct("SharedSecret")
                .field("user_secret", &"[REDACTED]")
                .field("admin_secret", &"[REDACTED]")
                .finish(),
            Self::Identity {
                admin_email_suffix, ..
            } => f
                .debug_struct("Identity")
                .field("admin_email_suffix", admin_email_suffix)
                .finish_non_exhaustive(),
        }
    }
}

/// Constant-time secret comparison.
pub(crate) fn secrets_match(given: &SecretString, expected: &SecretString) -> bool {
    given
        .expose_secret()
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}

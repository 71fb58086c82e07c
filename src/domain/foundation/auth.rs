//! Authentication types for the domain layer.
//!
//! These types represent an identity returned by an authentication backend.
//! They have **no external dependencies** - any backend (a hosted auth
//! service, a test double) can populate them via the `AuthBackend` port.
//!
//! # Design Decisions
//!
//! - `AuthenticatedUser` contains only the attributes we actually use
//! - `AuthError` is domain-centric, not backend-specific
//! - Types are `Clone` so they can live inside watch-channel snapshots

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ErrorCode, UserId};

/// Identity established by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the auth backend.
    pub id: UserId,

    /// User's email address.
    pub email: String,

    /// Display name if available.
    pub display_name: Option<String>,

    /// Whether the user's email has been verified by the auth backend.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
        }
    }

    /// Returns the user's display name, or email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Case-insensitive check of the email domain against a suffix such as
    /// `@example.com`.
    ///
    /// An empty suffix never matches.
    pub fn email_has_suffix(&self, suffix: &str) -> bool {
        email_has_suffix(&self.email, suffix)
    }
}

/// Case-insensitive email suffix match shared by identity checks and
/// pre-flight credential checks.
///
/// Only the domain after the last `@` is compared, and it must equal the
/// suffix's domain exactly, so `@admin.example.com` does not match
/// `eve@evil-admin.example.com` or `eve@sub.admin.example.com`.
pub fn email_has_suffix(email: &str, suffix: &str) -> bool {
    let expected = suffix.trim();
    let expected = expected.strip_prefix('@').unwrap_or(expected);
    if expected.is_empty() {
        return false;
    }
    match email.trim().rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() => domain.eq_ignore_ascii_case(expected),
        _ => false,
    }
}

/// Authentication errors.
///
/// These errors are **domain-centric** - they describe what went wrong
/// from the application's perspective, not the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The credential was rejected.
    #[error("Incorrect password. Please try again.")]
    InvalidCredentials,

    /// No session is active for an action that needs one.
    #[error("Please log in to continue")]
    NotSignedIn,

    /// The identity policy needs an email and none was supplied.
    #[error("An email address is required to sign in")]
    MissingEmail,

    /// A stored session token is no longer accepted.
    #[error("Invalid or expired session token")]
    InvalidToken,

    /// Credential is valid but lacks the privilege for this action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::NotSignedIn | AuthError::InvalidToken
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::NotSignedIn
            | AuthError::MissingEmail
            | AuthError::InvalidToken => ErrorCode::Unauthorized,
            AuthError::InsufficientPermissions => ErrorCode::Forbidden,
            AuthError::ServiceUnavailable(_) => ErrorCode::RemoteUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(email: &str) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("user-123").unwrap(), email, None, true)
    }

    #[test]
    fn authenticated_user_display_name_or_email_returns_name_when_present() {
        let user = AuthenticatedUser::new(
            UserId::new("user-123").unwrap(),
            "test@example.com",
            Some("Alice".to_string()),
            true,
        );

        assert_eq!(user.display_name_or_email(), "Alice");
    }

    #[test]
    fn authenticated_user_display_name_or_email_returns_email_when_no_name() {
        let user = test_user("bob@example.com");
        assert_eq!(user.display_name_or_email(), "bob@example.com");
    }

    #[test]
    fn email_suffix_match_is_case_insensitive() {
        let user = test_user("Ops@Admin.Example.com");
        assert!(user.email_has_suffix("@admin.example.com"));
        assert!(!user.email_has_suffix("@example.org"));
    }

    #[test]
    fn empty_suffix_never_matches() {
        assert!(!email_has_suffix("anyone@example.com", ""));
        assert!(!email_has_suffix("anyone@example.com", "   "));
        assert!(!email_has_suffix("anyone@example.com", "@"));
    }

    #[test]
    fn look_alike_domains_never_match() {
        assert!(!email_has_suffix("eve@evil-admin.example.com", "@admin.example.com"));
        assert!(!email_has_suffix("eve@evil-admin.example.com", "admin.example.com"));
        assert!(!email_has_suffix("eve@sub.admin.example.com", "@admin.example.com"));
        assert!(!email_has_suffix("admin.example.com", "@admin.example.com"));
        assert!(!email_has_suffix("@admin.example.com", "@admin.example.com"));
        assert!(email_has_suffix("ops@admin.example.com", "@admin.example.com"));
        assert!(email_has_suffix(" ops@ADMIN.example.com ", "admin.example.com"));
    }

    #[test]
    fn auth_error_invalid_credentials_displays_source_message() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Incorrect password. Please try again."
        );
    }

    #[test]
    fn auth_error_service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }

    #[test]
    fn auth_error_classification() {
        assert!(AuthError::InvalidCredentials.requires_reauthentication());
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::NotSignedIn.requires_reauthentication());
        assert_eq!(AuthError::NotSignedIn.code(), ErrorCode::Unauthorized);
        assert!(!AuthError::InsufficientPermissions.requires_reauthentication());
        assert!(AuthError::service_unavailable("timeout").is_transient());
        assert!(!AuthError::InvalidCredentials.is_transient());
        assert_eq!(AuthError::InsufficientPermissions.code(), ErrorCode::Forbidden);
    }
}

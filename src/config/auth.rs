//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::runtime::Environment;
use crate::application::{DEFAULT_ADMIN_SECRET, DEFAULT_USER_SECRET};

/// Which admin policy the session manager runs under
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthPolicyKind {
    /// Two shared passwords, one per role
    #[default]
    SharedSecret,
    /// Email/password against the identity backend
    Identity,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Admin policy
    #[serde(default)]
    pub policy: AuthPolicyKind,

    /// User-view password (shared-secret policy)
    #[serde(default = "default_user_password")]
    pub user_password: SecretString,

    /// Admin password (shared-secret policy)
    #[serde(default = "default_admin_password")]
    pub admin_password: SecretString,

    /// Identity backend base URL (identity policy)
    pub backend_url: Option<String>,

    /// Anonymous API key for the identity backend
    pub api_key: Option<SecretString>,

    /// Email suffix that grants admin (identity policy)
    pub admin_email_suffix: Option<String>,

    /// Identity backend request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl AuthConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn uses_default_secrets(&self) -> bool {
        self.user_password.expose_secret() == DEFAULT_USER_SECRET
            || self.admin_password.expose_secret() == DEFAULT_ADMIN_SECRET
    }

    /// Validate authentication configuration
    ///
    /// The identity policy needs a backend URL, an API key and an admin
    /// email suffix. In production the backend must use HTTPS and the
    /// built-in passwords are refused.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        match self.policy {
            AuthPolicyKind::SharedSecret => {
                if self.user_password.expose_secret().is_empty() {
                    return Err(ValidationError::EmptySecret("AUTH__USER_PASSWORD"));
                }
                if self.admin_password.expose_secret().is_empty() {
                    return Err(ValidationError::EmptySecret("AUTH__ADMIN_PASSWORD"));
                }
                if *environment == Environment::Production && self.uses_default_secrets() {
                    return Err(ValidationError::DefaultSecretInProduction);
                }
            }
            AuthPolicyKind::Identity => {
                let url = self
                    .backend_url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .ok_or(ValidationError::MissingRequired("AUTH__BACKEND_URL"))?;
                url::Url::parse(url).map_err(|_| ValidationError::InvalidUrl("AUTH__BACKEND_URL"))?;
                if self.api_key.is_none() {
                    return Err(ValidationError::MissingRequired("AUTH__API_KEY"));
                }
                let suffix = self
                    .admin_email_suffix
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(ValidationError::MissingRequired("AUTH__ADMIN_EMAIL_SUFFIX"))?;
                if !suffix.starts_with('@') || suffix.len() == 1 || suffix[1..].contains('@') {
                    return Err(ValidationError::InvalidEmailSuffix(suffix.to_string()));
                }
                if *environment == Environment::Production && !url.starts_with("https://") {
                    return Err(ValidationError::MustBeHttps("AUTH__BACKEND_URL"));
                }
            }
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            policy: AuthPolicyKind::default(),
            user_password: default_user_password(),
            admin_password: default_admin_password(),
            backend_url: None,
            api_key: None,
            admin_email_suffix: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_user_password() -> SecretString {
    SecretString::new(DEFAULT_USER_SECRET.to_string())
}

fn default_admin_password() -> SecretString {
    SecretString::new(DEFAULT_ADMIN_SECRET.to_string())
}

fn default_request_timeout() -> u64 {
    30
}

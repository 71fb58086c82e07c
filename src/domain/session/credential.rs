//! Login credential.

use secrecy::{ExposeSecret, SecretString};

/// What a login form submits.
///
/// The shared-secret policy only looks at `password`; the identity policy
/// requires `email` as well.
#[derive(Debug)]
pub struct Credential {
    email: Option<String>,
    password: SecretString,
}

impl Credential {
    /// Password-only credential.
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            email: None,
            password: SecretString::new(password.into()),
        }
    }

    /// Email + password credential.
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into().trim().to_string();
        Self {
            email: if email.is_empty() { None } else { Some(email) },
            password: SecretString::new(password.into()),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn secret(&self) -> &SecretString {
        &self.password
    }

    pub fn is_blank(&self) -> bool {
        self.password.expose_secret().is_empty()
    }
}

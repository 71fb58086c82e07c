//! Tool store configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::runtime::Environment;
use crate::application::ConsistencyPolicy;

/// Tool persistence configuration
///
/// Without an `endpoint_url` the store runs offline against local storage.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// REST endpoint base URL
    pub endpoint_url: Option<String>,

    /// API key sent with every request
    pub api_key: Option<SecretString>,

    /// Table holding the tools
    #[serde(default = "default_table")]
    pub table: String,

    /// Column used to order the full fetch; empty disables ordering
    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// What the store does after a confirmed write
    #[serde(default)]
    pub consistency: ConsistencyPolicy,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    /// True when no remote endpoint is configured
    pub fn is_offline(&self) -> bool {
        self.endpoint_url.as_deref().map_or(true, str::is_empty)
    }

    /// Ordering column, if any
    pub fn order_by(&self) -> Option<&str> {
        let column = self.order_by.trim();
        (!column.is_empty()).then_some(column)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.table.is_empty()
            || !self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ValidationError::InvalidTableName(self.table.clone()));
        }

        let Some(url) = self.endpoint_url.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(());
        };
        url::Url::parse(url).map_err(|_| ValidationError::InvalidUrl("STORE__ENDPOINT_URL"))?;
        if self.api_key.is_none() {
            return Err(ValidationError::MissingRequired("STORE__API_KEY"));
        }
        if *environment == Environment::Production && !url.starts_with("https://") {
            return Err(ValidationError::MustBeHttps("STORE__ENDPOINT_URL"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_key: None,
            table: default_table(),
            order_by: default_order_by(),
            consistency: ConsistencyPolicy::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_table() -> String {
    "tools".to_string()
}

fn default_order_by() -> String {
    "created_at".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str) -> StoreConfig {
        StoreConfig {
            endpoint_url: Some(url.to_string()),
            api_key: Some(SecretString::new("anon".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert!(config.is_offline());
        assert_eq!(config.table, "tools");
        assert_eq!(config.order_by(), Some("created_at"));
        assert_eq!(config.consistency, ConsistencyPolicy::RefetchAfterWrite);
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_empty_order_by_disables_ordering() {
        let config = StoreConfig {
            order_by: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.order_by(), None);
    }

    #[test]
    fn test_remote_requires_api_key() {
        let config = StoreConfig {
            api_key: None,
            ..remote("https://db.example.co")
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("STORE__API_KEY"))
        );
    }

    #[test]
    fn test_remote_requires_https_in_production() {
        let config = remote("http://localhost:54321");
        assert!(!config.is_offline());
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_rejects_malformed_url_and_table() {
        assert!(remote("not a url").validate(&Environment::Development).is_err());

        let config = StoreConfig {
            table: "tools;drop".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidTableName(_))
        ));
    }
}

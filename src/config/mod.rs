//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOOL_DIRECTORY` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working offline
//! setup with the shared-secret policy.
//!
//! # Example
//!
//! ```no_run
//! use tool_directory::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Local storage at {}", config.storage.path.display());
//! ```

mod auth;
mod error;
mod runtime;
mod storage;
mod store;

pub use auth::{AuthConfig, AuthPolicyKind};
pub use error::{ConfigError, ValidationError};
pub use runtime::{Environment, LogFormat, RuntimeConfig};
pub use storage::StorageConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Session policy and identity backend
    #[serde(default)]
    pub auth: AuthConfig,

    /// Tool persistence endpoint
    #[serde(default)]
    pub store: StoreConfig,

    /// Local key/value storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOOL_DIRECTORY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOOL_DIRECTORY__AUTH__POLICY=identity` -> `auth.policy = identity`
    /// - `TOOL_DIRECTORY__STORE__ENDPOINT_URL=...` -> `store.endpoint_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOOL_DIRECTORY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Identity policy completeness (backend URL, key, admin suffix)
    /// - URL formats and timeouts
    /// - Production-specific requirements (HTTPS, no built-in passwords)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        self.auth.validate(&self.runtime.environment)?;
        self.store.validate(&self.runtime.environment)?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

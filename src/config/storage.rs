//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Durable local key/value storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the session flags and offline tools
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__PATH"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/local_storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert!(config.path.ends_with("local_storage.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let config = StorageConfig {
            path: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}

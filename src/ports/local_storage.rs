//! Local storage port - durable key/value surface.
//!
//! Read synchronously at startup so the first render reflects the prior
//! session, and written synchronously on every session-flag change.

/// Key holding the authenticated flag (`"true"` when set).
pub const AUTHENTICATED_KEY: &str = "authenticated";

/// Key holding the admin flag (`"true"` when set).
pub const ADMIN_KEY: &str = "admin";

/// Key holding the serialized tool collection in offline mode.
pub const TOOLS_KEY: &str = "tools";

/// Key holding a persisted identity-backend access token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Errors that can occur during local storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize storage: {0}")]
    Serialization(String),

    #[error("Failed to deserialize storage: {0}")]
    Deserialization(String),
}

/// Synchronous key/value store.
///
/// Every successful `set`/`remove` must be durable when it returns.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Reads a boolean-as-text flag. Unreadable or absent means `false`.
    fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(v)) if v == "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStorage(Mutex<HashMap<String, String>>);

    impl LocalStorage for MapStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn flag_reads_only_literal_true() {
        let storage = MapStorage::default();
        assert!(!storage.flag(ADMIN_KEY));

        storage.set(ADMIN_KEY, "true").unwrap();
        assert!(storage.flag(ADMIN_KEY));

        storage.set(ADMIN_KEY, "TRUE").unwrap();
        assert!(!storage.flag(ADMIN_KEY));

        storage.set(ADMIN_KEY, "false").unwrap();
        assert!(!storage.flag(ADMIN_KEY));
    }
}

//! Offline tool repository.
//!
//! Used when no remote endpoint is configured. The serialized collection
//! lives under the `tools` key of local storage and this adapter acts as
//! its own persistence layer, assigning ids itself.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::ToolId;
use crate::domain::tool::{NewTool, Tool, ToolPatch};
use crate::ports::{LocalStorage, RepositoryError, StorageError, ToolRepository, TOOLS_KEY};

/// Tool repository over `LocalStorage`.
pub struct LocalToolRepository {
    storage: Arc<dyn LocalStorage>,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl LocalToolRepository {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Vec<Tool>, RepositoryError> {
        match self.storage.get(TOOLS_KEY).map_err(storage_error)? {
            None => Ok(Vec::new()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| RepositoryError::Decode(e.to_string()))
            }
        }
    }

    fn write(&self, tools: &[Tool]) -> Result<(), RepositoryError> {
        let raw =
            serde_json::to_string(tools).map_err(|e| RepositoryError::Decode(e.to_string()))?;
        self.storage.set(TOOLS_KEY, &raw).map_err(storage_error)
    }
}

fn storage_error(e: StorageError) -> RepositoryError {
    RepositoryError::unavailable(format!("local storage: {}", e))
}

#[async_trait]
impl ToolRepository for LocalToolRepository {
    async fn list_all(&self) -> Result<Vec<Tool>, RepositoryError> {
        self.read()
    }

    async fn insert(&self, fields: &NewTool) -> Result<Tool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut tools = self.read()?;
        let tool = Tool::from_new(ToolId::generate(), fields.clone());
        tools.push(tool.clone());
        self.write(&tools)?;
        Ok(tool)
    }

    async fn update(&self, id: &ToolId, patch: &ToolPatch) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut tools = self.read()?;
        let tool = tools
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        tool.apply(patch);
        self.write(&tools)
    }

    async fn delete(&self, id: &ToolId) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut tools = self.read()?;
        let before = tools.len();
        tools.retain(|t| &t.id != id);
        if tools.len() == before {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        self.write(&tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryLocalStorage;

    fn fields(name: &str) -> NewTool {
        NewTool::new(name, "desc", "https://example.com").unwrap()
    }

    #[tokio::test]
    async fn empty_storage_lists_nothing() {
        let repo = LocalToolRepository::new(Arc::new(InMemoryLocalStorage::new()));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collection_persists_under_tools_key() {
        let storage = Arc::new(InMemoryLocalStorage::new());
        let repo = LocalToolRepository::new(storage.clone());

        let tool = repo.insert(&fields("a")).await.unwrap();
        repo.update(&tool.id, &ToolPatch::new().with_name("b")).await.unwrap();

        let raw = storage.get(TOOLS_KEY).unwrap().unwrap();
        let saved: Vec<Tool> = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "b");

        // a second repository over the same storage sees the same rows
        let again = LocalToolRepository::new(storage);
        assert_eq!(again.list_all().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = LocalToolRepository::new(Arc::new(InMemoryLocalStorage::new()));
        let result = repo.delete(&ToolId::new("nope").unwrap()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn storage_failure_maps_to_unavailable() {
        let storage = Arc::new(InMemoryLocalStorage::new());
        storage.fail_writes(true);
        let repo = LocalToolRepository::new(storage);

        let result = repo.insert(&fields("a")).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn corrupt_collection_is_decode_error() {
        let storage = Arc::new(InMemoryLocalStorage::new().with_entry(TOOLS_KEY, "{oops"));
        let repo = LocalToolRepository::new(storage);
        assert!(matches!(repo.list_all().await, Err(RepositoryError::Decode(_))));
    }
}

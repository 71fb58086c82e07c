//! In-memory tool repository.
//!
//! Simulates the remote endpoint: assigns ids, keeps insertion order, and
//! lets tests inject failures, count calls, and hold calls in flight.
//!
//! # Example
//!
//! ```ignore
//! let repo = Arc::new(InMemoryToolRepository::gated());
//! let store = Arc::new(ToolStore::new(repo.clone(), notifier, ConsistencyPolicy::default()));
//!
//! let task = tokio::spawn({ let s = store.clone(); async move { s.create(draft).await } });
//! // ... assert store.is_loading() ...
//! repo.release(1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{RwLock, Semaphore};

use crate::domain::foundation::ToolId;
use crate::domain::tool::{NewTool, Tool, ToolPatch};
use crate::ports::{RepositoryError, ToolRepository};

/// The four repository operations, for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolOperation {
    List,
    Insert,
    Update,
    Delete,
}

/// In-memory endpoint simulation
#[derive(Debug, Default)]
pub struct InMemoryToolRepository {
    rows: RwLock<Vec<Tool>>,
    failures: Mutex<HashMap<ToolOperation, RepositoryError>>,
    calls: Mutex<HashMap<ToolOperation, usize>>,
    gate: Option<Arc<Semaphore>>,
    waiting: AtomicUsize,
}

impl InMemoryToolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for a `release` before it touches the rows.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Starts with rows already present on the "server".
    pub fn with_tools(tools: Vec<Tool>) -> Self {
        Self {
            rows: RwLock::new(tools),
            ..Self::default()
        }
    }

    /// Lets `n` gated calls proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of calls currently parked on the gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Makes `op` fail with `error` until cleared.
    pub fn fail_on(&self, op: ToolOperation, error: RepositoryError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(op, error);
        }
    }

    pub fn clear_failure(&self, op: ToolOperation) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(&op);
        }
    }

    /// How many times `op` was called.
    pub fn calls(&self, op: ToolOperation) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Adds a row as if another client had inserted it.
    pub async fn insert_external(&self, fields: NewTool) -> Tool {
        let tool = Tool::from_new(ToolId::generate(), fields);
        self.rows.write().await.push(tool.clone());
        tool
    }

    /// Current server-side rows.
    pub async fn rows(&self) -> Vec<Tool> {
        self.rows.read().await.clone()
    }

    async fn enter(&self, op: ToolOperation) -> Result<(), RepositoryError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(op).or_insert(0) += 1;
        }

        if let Some(gate) = &self.gate {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let acquired = gate.acquire().await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
            acquired
                .map_err(|_| RepositoryError::unavailable("gate closed"))?
                .forget();
        }

        let forced = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.get(&op).cloned());
        match forced {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ToolRepository for InMemoryToolRepository {
    async fn list_all(&self) -> Result<Vec<Tool>, RepositoryError> {
        self.enter(ToolOperation::List).await?;
        Ok(self.rows.read().await.clone())
    }

    async fn insert(&self, fields: &NewTool) -> Result<Tool, RepositoryError> {
        self.enter(ToolOperation::Insert).await?;
        let tool = Tool::from_new(ToolId::generate(), fields.clone());
        self.rows.write().await.push(tool.clone());
        Ok(tool)
    }

    async fn update(&self, id: &ToolId, patch: &ToolPatch) -> Result<(), RepositoryError> {
        self.enter(ToolOperation::Update).await?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        row.apply(patch);
        Ok(())
    }

    async fn delete(&self, id: &ToolId) -> Result<(), RepositoryError> {
        self.enter(ToolOperation::Delete).await?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| &t.id != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }
}

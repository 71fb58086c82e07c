//! ToolStore - the authoritative in-memory tool collection.
//!
//! All mutations are confirm-then-apply: the local collection changes only
//! after the repository acknowledges the write. Readers get snapshots or a
//! `watch` subscription; they never see a half-applied change.

use serde::Deserialize;
use std::sync::Arc;

use tokio::sync::watch;

use super::error::ToolError;
use crate::domain::foundation::{Notice, ToolId};
use crate::domain::tool::{Tool, ToolDraft, ToolPatch, ToolQuery};
use crate::ports::{Notifier, RepositoryError, ToolRepository};

/// What the store does after a confirmed create or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyPolicy {
    /// Re-fetch the full collection and replace the local copy.
    #[default]
    RefetchAfterWrite,
    /// Apply the endpoint's response locally and stop there.
    TrustResponse,
}

/// Coarse lifecycle of the store, derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    tools: Vec<Tool>,
    in_flight: usize,
    loaded: bool,
    last_error: Option<RepositoryError>,
}

impl StoreSnapshot {
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, id: &ToolId) -> Option<&Tool> {
        self.tools.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &ToolId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&RepositoryError> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> StorePhase {
        if self.in_flight > 0 {
            StorePhase::Loading
        } else if self.last_error.is_some() {
            StorePhase::Error
        } else if self.loaded {
            StorePhase::Ready
        } else {
            StorePhase::Uninitialized
        }
    }

    fn replace(&mut self, tools: Vec<Tool>) {
        self.tools = tools;
        self.loaded = true;
    }

    /// Ids stay unique: a returned row already present replaces its entry.
    fn upsert(&mut self, tool: Tool) {
        match self.tools.iter_mut().find(|t| t.id == tool.id) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }
}

/// Counts one remote call as in flight for as long as it lives.
struct InFlight<'a> {
    state: &'a watch::Sender<StoreSnapshot>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a watch::Sender<StoreSnapshot>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

/// Owns the tool collection and mediates every write against the
/// repository.
pub struct ToolStore {
    repository: Arc<dyn ToolRepository>,
    notifier: Arc<dyn Notifier>,
    consistency: ConsistencyPolicy,
    state: watch::Sender<StoreSnapshot>,
}

impl ToolStore {
    /// Creates an empty, unloaded store. Call `load` for the initial fetch.
    pub fn new(
        repository: Arc<dyn ToolRepository>,
        notifier: Arc<dyn Notifier>,
        consistency: ConsistencyPolicy,
    ) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            repository,
            notifier,
            consistency,
            state,
        }
    }

    pub fn consistency(&self) -> ConsistencyPolicy {
        self.consistency
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    pub fn list(&self) -> Vec<Tool> {
        self.state.borrow().tools.clone()
    }

    pub fn get(&self, id: &ToolId) -> Option<Tool> {
        self.state.borrow().get(id).cloned()
    }

    /// Filtered and sorted copy of the collection. The stored order is
    /// unaffected.
    pub fn query(&self, query: &ToolQuery) -> Vec<Tool> {
        let state = self.state.borrow();
        query.apply(&state.tools).into_iter().cloned().collect()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn last_error(&self) -> Option<RepositoryError> {
        self.state.borrow().last_error.clone()
    }

    pub fn phase(&self) -> StorePhase {
        self.state.borrow().phase()
    }

    /// Full fetch. Replaces the local collection on success; keeps it on
    /// failure.
    pub async fn load(&self) -> Result<(), ToolError> {
        let _flight = InFlight::begin(&self.state);

        match self.repository.list_all().await {
            Ok(tools) => {
                tracing::debug!(count = tools.len(), "Tools loaded");
                self.state.send_modify(|s| {
                    s.replace(tools);
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => Err(self.remote_failure("Failed to load tools", e)),
        }
    }

    /// Validates `draft`, inserts it remotely, then applies the stored row.
    pub async fn create(&self, draft: ToolDraft) -> Result<Tool, ToolError> {
        let fields = draft.validate()?;

        let _flight = InFlight::begin(&self.state);
        let tool = match self.repository.insert(&fields).await {
            Ok(tool) => tool,
            Err(e) => return Err(self.remote_failure("Failed to add tool", e)),
        };

        self.state.send_modify(|s| s.upsert(tool.clone()));
        self.refresh_after_write().await;

        tracing::info!(tool_id = %tool.id, "Tool created");
        self.notifier.notify(Notice::success(
            "Tool Added",
            "The tool has been successfully added.",
        ));
        Ok(tool)
    }

    /// Partial update. Fields absent from `patch` are left as they are.
    pub async fn update(&self, id: &ToolId, patch: ToolPatch) -> Result<(), ToolError> {
        let patch = patch.validate()?;

        if !self.state.borrow().contains(id) {
            tracing::debug!(tool_id = %id, "Update of unknown tool");
            let error = ToolError::NotFound(id.clone());
            self.notifier.notify(Notice::error("Error", error.to_string()));
            return Err(error);
        }
        if patch.is_empty() {
            return Ok(());
        }

        let _flight = InFlight::begin(&self.state);
        if let Err(e) = self.repository.update(id, &patch).await {
            return Err(self.remote_failure("Failed to update tool", e));
        }

        self.state.send_modify(|s| {
            if let Some(tool) = s.tools.iter_mut().find(|t| &t.id == id) {
                tool.apply(&patch);
            }
        });
        self.refresh_after_write().await;

        tracing::info!(tool_id = %id, "Tool updated");
        self.notifier.notify(Notice::success(
            "Tool Updated",
            "The tool has been successfully updated.",
        ));
        Ok(())
    }

    /// Removes the tool once the repository confirms. Never re-fetches.
    pub async fn delete(&self, id: &ToolId) -> Result<(), ToolError> {
        let _flight = InFlight::begin(&self.state);
        if let Err(e) = self.repository.delete(id).await {
            return Err(self.remote_failure("Failed to delete tool", e));
        }

        self.state.send_modify(|s| {
            s.tools.retain(|t| &t.id != id);
            s.last_error = None;
        });

        tracing::info!(tool_id = %id, "Tool deleted");
        self.notifier.notify(Notice::success(
            "Tool Deleted",
            "The tool has been successfully deleted.",
        ));
        Ok(())
    }

    /// Settles a confirmed write. The error slot is cleared last, after any
    /// re-fetch.
    async fn refresh_after_write(&self) {
        if self.consistency == ConsistencyPolicy::RefetchAfterWrite {
            match self.repository.list_all().await {
                Ok(tools) => self.state.send_modify(|s| s.replace(tools)),
                Err(e) => {
                    tracing::warn!(error = %e, "Re-fetch after write failed; keeping local copy");
                    self.notifier.notify(Notice::warning(
                        "Tool list may be out of date",
                        format!("The change was saved but the list could not be refreshed: {}", e),
                    ));
                }
            }
        }
        self.state.send_modify(|s| s.last_error = None);
    }

    fn remote_failure(&self, context: &str, error: RepositoryError) -> ToolError {
        tracing::warn!(code = %error.code(), error = %error, "{}", context);
        self.state
            .send_modify(|s| s.last_error = Some(error.clone()));
        self.notifier
            .notify(Notice::error("Error", format!("{}: {}", context, error)));
        ToolError::Remote(error)
    }
}

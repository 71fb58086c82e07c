//! Tool repository port - the remote persistence endpoint.
//!
//! The tool store depends only on this four-operation contract:
//! select-all, insert-one, update-by-id and delete-by-id. Transport and
//! protocol belong to the adapter.
//!
//! # Example
//!
//! ```ignore
//! let repo: Arc<dyn ToolRepository> = Arc::new(RestToolRepository::new(config)?);
//! let tools = repo.list_all().await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{ErrorCode, ToolId};
use crate::domain::tool::{NewTool, Tool, ToolPatch};

/// Errors returned by a persistence endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Tool not found: {0}")]
    NotFound(ToolId),

    #[error("Persistence endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RepositoryError::NotFound(_) => ErrorCode::ToolNotFound,
            RepositoryError::Unavailable(_) => ErrorCode::RemoteUnavailable,
            RepositoryError::Rejected { status: 401, .. } => ErrorCode::Unauthorized,
            RepositoryError::Rejected { status: 403, .. } => ErrorCode::Forbidden,
            RepositoryError::Rejected { .. } => ErrorCode::RemoteRejected,
            RepositoryError::Decode(_) => ErrorCode::InternalError,
        }
    }
}

/// Remote tabular store of tools.
///
/// # Contract
///
/// Implementations must:
/// - Return rows from `list_all` in insertion order
/// - Assign the id in `insert` and return the stored row
/// - Return `RepositoryError::NotFound` from `update`/`delete` when no row
///   matches the id
/// - Never partially apply a patch
#[async_trait]
pub trait ToolRepository: Send + Sync {
    /// Select every tool.
    async fn list_all(&self) -> Result<Vec<Tool>, RepositoryError>;

    /// Insert one tool; the endpoint assigns its id.
    async fn insert(&self, fields: &NewTool) -> Result<Tool, RepositoryError>;

    /// Overwrite the fields present in `patch` on the tool with `id`.
    async fn update(&self, id: &ToolId, patch: &ToolPatch) -> Result<(), RepositoryError>;

    /// Permanently remove the tool with `id`.
    async fn delete(&self, id: &ToolId) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_error_codes() {
        let id = ToolId::new("x").unwrap();
        assert_eq!(RepositoryError::NotFound(id).code(), ErrorCode::ToolNotFound);
        assert_eq!(
            RepositoryError::unavailable("down").code(),
            ErrorCode::RemoteUnavailable
        );
        assert_eq!(
            RepositoryError::rejected(401, "jwt expired").code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            RepositoryError::rejected(409, "duplicate").code(),
            ErrorCode::RemoteRejected
        );
    }

    #[test]
    fn repository_error_display_includes_status() {
        let err = RepositoryError::rejected(400, "bad column");
        assert_eq!(err.to_string(), "Request rejected (400): bad column");
    }

    #[test]
    fn tool_repository_trait_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn ToolRepository) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn ToolRepository>>();
    }
}

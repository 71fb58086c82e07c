//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these
//! ports.
//!
//! - `ToolRepository` - Remote persistence endpoint for tools
//! - `AuthBackend` - Identity backend with session-change notifications
//! - `LocalStorage` - Durable synchronous key/value store
//! - `Notifier` - Advisory notifications

mod auth_backend;
mod local_storage;
mod notifier;
mod tool_repository;

pub use auth_backend::{AuthBackend, SessionChange};
pub use local_storage::{
    LocalStorage, StorageError, ADMIN_KEY, AUTHENTICATED_KEY, AUTH_TOKEN_KEY, TOOLS_KEY,
};
pub use notifier::Notifier;
pub use tool_repository::{RepositoryError, ToolRepository};

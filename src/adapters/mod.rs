//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application layer to external systems:
//! - `tools` - Tool persistence endpoints (REST, offline, in-memory)
//! - `auth` - Identity backends (REST, mock)
//! - `storage` - Durable local key/value storage (file, in-memory)
//! - `notify` - Advisory notification sinks (log, recording)

pub mod auth;
pub mod notify;
pub mod storage;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{MockAuthBackend, RestAuthBackend, RestAuthConfig};
pub use notify::{RecordingNotifier, TracingNotifier};
pub use storage::{FileLocalStorage, InMemoryLocalStorage};
pub use tools::{
    InMemoryToolRepository, LocalToolRepository, RestToolConfig, RestToolRepository,
    ToolOperation,
};

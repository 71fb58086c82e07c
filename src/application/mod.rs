//! Application layer - services that presentation code calls into.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Both services convert failures into return values plus advisory notices
//! at their boundary; nothing here panics on a remote failure.

pub mod context;
pub mod session;
pub mod tools;

pub use context::{AppContext, ContextError};
pub use session::{AdminPolicy, SessionManager, DEFAULT_ADMIN_SECRET, DEFAULT_USER_SECRET};
pub use tools::{ConsistencyPolicy, StorePhase, StoreSnapshot, ToolError, ToolStore};

//! Tool application service.
//!
//! - `ToolStore` - confirm-then-apply CRUD over a `ToolRepository`
//! - `StoreSnapshot` / `StorePhase` - observable store state
//! - `ConsistencyPolicy` - what happens after a confirmed write
//! - `ToolError` - mutation failures

mod error;
mod store;

pub use error::ToolError;
pub use store::{ConsistencyPolicy, StorePhase, StoreSnapshot, ToolStore};

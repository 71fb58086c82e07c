//! Tool module - the unit managed by the tool store.
//!
//! - `Tool` - stored entity (id assigned by the persistence endpoint)
//! - `ToolDraft` - raw create-form input
//! - `NewTool` - validated create input
//! - `ToolPatch` - partial update, validated per present field
//! - `ToolQuery` - filter/sort view over a snapshot

mod model;
mod view;

pub use model::{NewTool, Tool, ToolDraft, ToolPatch};
pub use view::{ToolQuery, ToolSort};

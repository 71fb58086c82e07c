//! Session application service.
//!
//! - `SessionManager` - login/logout, persisted flags, backend reconciliation
//! - `AdminPolicy` - shared-secret or identity-backed admin decision

mod manager;
mod policy;

pub use manager::SessionManager;
pub use policy::{AdminPolicy, DEFAULT_ADMIN_SECRET, DEFAULT_USER_SECRET};

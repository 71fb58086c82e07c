//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types, authentication types and advisory
//! notices that form the vocabulary of the tool directory.

mod auth;
mod errors;
mod ids;
mod notice;

pub use auth::{email_has_suffix, AuthError, AuthenticatedUser};
pub use errors::{ErrorCode, ValidationError, ValidationErrors};
pub use ids::{ToolId, UserId};
pub use notice::{Notice, NoticeLevel};

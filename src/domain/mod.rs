//! Domain layer containing business types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, auth types, notices)
//! - `tool` - Tool entity, validated inputs and list views
//! - `session` - Session snapshot, access guards and credentials

pub mod foundation;
pub mod session;
pub mod tool;

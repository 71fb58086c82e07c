//! Authentication adapters.
//!
//! Implementations of the `AuthBackend` port:
//!
//! - `mock` - In-memory accounts for tests, no external services
//! - `rest` - GoTrue-style password-grant auth service

mod mock;
mod rest;

pub use mock::MockAuthBackend;
pub use rest::{RestAuthBackend, RestAuthConfig};

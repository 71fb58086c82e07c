//! Tool repository adapters.
//!
//! Implementations of the `ToolRepository` port:
//!
//! - `rest` - PostgREST-style HTTP endpoint (production)
//! - `local` - offline mode over `LocalStorage`
//! - `in_memory` - endpoint simulation with failure injection (testing)

mod in_memory;
mod local;
mod rest;

pub use in_memory::{InMemoryToolRepository, ToolOperation};
pub use local::LocalToolRepository;
pub use rest::{RestToolConfig, RestToolRepository};

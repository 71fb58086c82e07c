//! Storage Adapters
//!
//! Implementations of the `LocalStorage` port.
//!
//! ## Available Adapters
//!
//! - **FileLocalStorage** - JSON object file on disk, atomically replaced
//! - **InMemoryLocalStorage** - map in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileLocalStorage, InMemoryLocalStorage};
//!
//! // Production: file-based storage
//! let storage = FileLocalStorage::open("./data/local_storage.json")?;
//!
//! // Testing: in-memory storage
//! let storage = InMemoryLocalStorage::new();
//! ```

mod file_local_storage;
mod in_memory_local_storage;

pub use file_local_storage::FileLocalStorage;
pub use in_memory_local_storage::InMemoryLocalStorage;

//! Adapters layer: Concrete implementations of ports.
//!
//! - `sqlite`: SQLite patient store (primary)
//! - `memory`: in-process patient store (fallback)
//! - `sanitize`: PII filtering for logs

pub mod memory;
pub mod sanitize;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StorageError};

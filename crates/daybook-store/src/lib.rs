//! Persistent entry store for Daybook.
//!
//! Defines the narrow `EntryStore` boundary the extraction engine commits
//! through, with an in-memory implementation for tests and a SQLite-backed
//! implementation for real use, plus the key-value snapshot store used to
//! persist serialized conversation state.

pub mod db;
pub mod entry;
pub mod memory;
pub mod migrations;
pub mod repository;
pub mod snapshot;
pub mod store;

pub use db::Database;
pub use entry::Entry;
pub use memory::MemoryStore;
pub use repository::SqliteStore;
pub use snapshot::{MemorySnapshots, SnapshotStore, SqliteSnapshots};
pub use store::EntryStore;

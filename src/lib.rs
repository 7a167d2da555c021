//! # Classgraph - Embedded class-inheritance graph database
//!
//! Models the static structure of a C/C++ codebase: source files, the
//! classes they declare, and inheritance edges between classes.
//!
//! Classgraph provides:
//! - An in-memory [`Database`] with idempotent get-or-add mutation and
//!   cascading file removal
//! - Order-independent structural equality between databases
//! - Persistence through interchangeable storage backends (SQLite and a
//!   JSON document store), all keyed by durable (path, name) identities

pub mod file;
pub mod class;
pub mod database;
pub mod compare;
pub mod storage;
pub mod persist;

// Re-exports for convenient access
pub use file::{FileKind, SourceFile};
pub use class::{Class, ClassKey};
pub use database::Database;
pub use compare::{equals, verify_equal};
pub use storage::{BackendKind, StorageBackend};

/// Result type alias for classgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for classgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unknown class reference: {0}")]
    InvalidReference(String),

    #[error("databases differ: {0}")]
    Mismatch(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

//! Storage Layer - pluggable durability backends
//!
//! Every backend persists the same logical shape:
//! - file records `{path, kind}`
//! - class records `{file_path, name}`
//! - relation records `{child_file_path, child_name, parent_file_path, parent_name}`
//!
//! Records are keyed by durable (path, name) identities, never by
//! backend-internal ids, so any two backends can agree on what they store.

pub mod schema;
pub mod sqlite;
pub mod json;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

use crate::class::ClassKey;
use crate::file::FileKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// A persisted file record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub kind: FileKind,
}

/// A persisted class record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub file_path: String,
    pub name: String,
}

impl ClassRecord {
    /// The identity key this record persists
    pub fn key(&self) -> ClassKey {
        ClassKey::new(&self.file_path, &self.name)
    }
}

/// A persisted parent-relation record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationRecord {
    pub child_file_path: String,
    pub child_name: String,
    pub parent_file_path: String,
    pub parent_name: String,
}

impl RelationRecord {
    /// Build a record from the edge's endpoint keys
    pub fn new(child: &ClassKey, parent: &ClassKey) -> Self {
        Self {
            child_file_path: child.file_path.clone(),
            child_name: child.name.clone(),
            parent_file_path: parent.file_path.clone(),
            parent_name: parent.name.clone(),
        }
    }

    /// Child endpoint key
    pub fn child(&self) -> ClassKey {
        ClassKey::new(&self.child_file_path, &self.child_name)
    }

    /// Parent endpoint key
    pub fn parent(&self) -> ClassKey {
        ClassKey::new(&self.parent_file_path, &self.parent_name)
    }
}

/// Full persisted state of one backend location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub files: Vec<FileRecord>,
    pub classes: Vec<ClassRecord>,
    pub relations: Vec<RelationRecord>,
}

impl Snapshot {
    /// True if nothing is persisted
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.classes.is_empty() && self.relations.is_empty()
    }
}

/// Contract every physical backend implements.
///
/// `put` calls upsert, `delete` calls are tolerant of absent records, and
/// nothing is guaranteed durable (or visible to other readers of the same
/// location) until `flush` returns. The in-memory database never branches
/// on which implementation sits behind this trait.
pub trait StorageBackend {
    /// Upsert a file record
    fn put_file(&mut self, path: &str, kind: FileKind) -> Result<()>;

    /// Delete a file record by path
    fn delete_file(&mut self, path: &str) -> Result<()>;

    /// Upsert a class record
    fn put_class(&mut self, file_path: &str, name: &str) -> Result<()>;

    /// Delete a class record by its identity key
    fn delete_class(&mut self, file_path: &str, name: &str) -> Result<()>;

    /// Upsert a parent-relation record
    fn put_parent_relation(&mut self, relation: &RelationRecord) -> Result<()>;

    /// Delete a parent-relation record
    fn delete_parent_relation(&mut self, relation: &RelationRecord) -> Result<()>;

    /// Read the full persisted state
    fn load_all(&mut self) -> Result<Snapshot>;

    /// Make all prior puts and deletes durable, or fail with an IO error
    fn flush(&mut self) -> Result<()>;
}

/// Which physical backend to bind a database location to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Relational engine (SQLite file)
    Sqlite,
    /// Embedded JSON document store (single file)
    Json,
}

impl BackendKind {
    /// Get the string representation of the backend kind
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Json => "json",
        }
    }

    /// Get all backend kinds
    pub fn all() -> &'static [BackendKind] {
        &[BackendKind::Sqlite, BackendKind::Json]
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sql" | "db" => Ok(BackendKind::Sqlite),
            "json" | "doc" => Ok(BackendKind::Json),
            _ => Err(Error::Parse(format!("Unknown backend kind: {}", s))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Open a backend handle at `path`.
///
/// The handle is an explicitly passed capability; there is no shared or
/// global connection state.
pub fn open_backend(path: &Path, kind: BackendKind) -> Result<Box<dyn StorageBackend>> {
    match kind {
        BackendKind::Sqlite => Ok(Box::new(SqliteStore::open(path)?)),
        BackendKind::Json => Ok(Box::new(JsonStore::open(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_roundtrip() {
        for kind in BackendKind::all() {
            let s = kind.as_str();
            let parsed: BackendKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
        assert!("parquet".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_relation_record_endpoints() {
        let child = ClassKey::new("child.cpp", "Child");
        let parent = ClassKey::new("parent.h", "Parent");
        let record = RelationRecord::new(&child, &parent);

        assert_eq!(record.child(), child);
        assert_eq!(record.parent(), parent);
    }
}

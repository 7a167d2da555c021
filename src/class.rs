//! Class entities and their durable identity keys
//!
//! A class is identified by `(declaring file path, class name)`. The name is
//! unique within its file, not globally: the same name in two files is two
//! distinct entities. The key is stable across reloads and across storage
//! backends, which is what makes cross-backend equality possible.

use serde::{Deserialize, Serialize};

/// Durable identity of a class: `(declaring file path, class name)`.
///
/// Serves as the primary key for classes and as both endpoints of parent
/// relations, in memory and in every storage backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassKey {
    /// Path of the declaring file
    pub file_path: String,
    /// Class name, unique within the declaring file
    pub name: String,
}

impl ClassKey {
    /// Create a new class key
    pub fn new(file_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ClassKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.file_path, self.name)
    }
}

/// A class declared in a source file.
///
/// Holds a weak back-reference to its declaring file (the path string, not
/// an owning handle) and its outgoing parent-class edges. Parents may live
/// in other files. The edge list is insertion-ordered and duplicate-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Class name
    pub name: String,
    /// Path of the declaring file (lookup key, not ownership)
    pub file_path: String,
    /// Outgoing inheritance edges, in insertion order
    pub(crate) parents: Vec<ClassKey>,
}

impl Class {
    /// Create a new class with no parent relations
    pub fn new(name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            parents: Vec::new(),
        }
    }

    /// Identity key of this class
    pub fn key(&self) -> ClassKey {
        ClassKey::new(&self.file_path, &self.name)
    }

    /// Direct parent classes, in edge insertion order
    pub fn parents(&self) -> impl Iterator<Item = &ClassKey> {
        self.parents.iter()
    }

    /// True if this class has a direct edge to `parent`
    pub fn has_parent(&self, parent: &ClassKey) -> bool {
        self.parents.contains(parent)
    }

    /// Insert an outgoing edge if absent. Returns true if it was added.
    pub(crate) fn add_parent(&mut self, parent: ClassKey) -> bool {
        if self.parents.contains(&parent) {
            return false;
        }
        self.parents.push(parent);
        true
    }

    /// Drop every edge pointing at a class of `file_path`
    pub(crate) fn remove_parents_in_file(&mut self, file_path: &str) {
        self.parents.retain(|p| p.file_path != file_path);
    }
}

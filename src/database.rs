//! Database - the root aggregate and mutation API
//!
//! Owns the set of source files and, transitively, all classes and parent
//! relations. All mutation goes through idempotent get-or-add operations;
//! entities are only destroyed by removing their declaring file, which
//! cascades to everything structurally dependent on it.

use crate::class::{Class, ClassKey};
use crate::file::{FileKind, SourceFile};
use crate::{Error, Result};
use std::collections::HashMap;

/// In-memory graph database of files, classes, and inheritance edges.
///
/// This is the authoritative state while the database is open; storage
/// backends only see it through the persistence layer. One `Database` is
/// bound to at most one backend location at a time, and all operations on
/// it are synchronous.
#[derive(Debug, Default)]
pub struct Database {
    /// All files indexed by path
    files: HashMap<String, SourceFile>,
}

impl Database {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the database holds no files (and therefore no classes or edges)
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    // ========== File Operations ==========

    /// Get the file at `path`, creating an empty one if absent.
    ///
    /// Idempotent: a second call with the same path returns the existing
    /// file unchanged, even if `kind` differs.
    pub fn get_or_add_file(&mut self, path: &str, kind: FileKind) -> &SourceFile {
        self.files
            .entry(path.to_string())
            .or_insert_with(|| SourceFile::new(path, kind))
    }

    /// True if a file with this path is registered
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Get a file by path
    pub fn get_file(&self, path: &str) -> Option<&SourceFile> {
        self.files.get(path)
    }

    /// All registered files, in no particular order
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    /// Number of registered files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // ========== Class Operations ==========

    /// Get the class `name` declared in the file at `file_path`, creating
    /// it if absent. The file must already be registered.
    ///
    /// Idempotent per `(file_path, name)`; returns the durable identity key.
    pub fn get_or_add_class(&mut self, file_path: &str, name: &str) -> Result<ClassKey> {
        let file = self
            .files
            .get_mut(file_path)
            .ok_or_else(|| Error::FileNotFound(file_path.to_string()))?;

        if file.get_class(name).is_none() {
            file.classes.push(Class::new(name, file_path));
        }

        Ok(ClassKey::new(file_path, name))
    }

    /// Look up a class by its identity key
    pub fn get_class(&self, key: &ClassKey) -> Option<&Class> {
        self.files.get(&key.file_path)?.get_class(&key.name)
    }

    /// True if the class is currently registered
    pub fn has_class(&self, key: &ClassKey) -> bool {
        self.get_class(key).is_some()
    }

    /// Classes declared in the file at `path`, in insertion order
    pub fn classes_in(&self, path: &str) -> Result<impl Iterator<Item = &Class>> {
        self.files
            .get(path)
            .map(|f| f.classes())
            .ok_or_else(|| Error::FileNotFound(path.to_string()))
    }

    /// Total number of classes across all files
    pub fn class_count(&self) -> usize {
        self.files.values().map(|f| f.classes.len()).sum()
    }

    // ========== Parent Relation Operations ==========

    /// Insert the inheritance edge `child -> parent` if absent.
    ///
    /// Re-adding an existing edge is a no-op. Both endpoints must be
    /// registered classes; a stale key from a removed file is rejected.
    /// Self-edges and cycles are accepted.
    pub fn add_parent_relation(&mut self, child: &ClassKey, parent: &ClassKey) -> Result<()> {
        if !self.has_class(parent) {
            return Err(Error::InvalidReference(parent.to_string()));
        }
        let child_class = self
            .files
            .get_mut(&child.file_path)
            .and_then(|f| f.get_class_mut(&child.name))
            .ok_or_else(|| Error::InvalidReference(child.to_string()))?;

        child_class.add_parent(parent.clone());
        Ok(())
    }

    /// Direct parent classes of `class`, in edge insertion order.
    ///
    /// Returns a restartable iterator; callers compose to walk chains.
    pub fn parent_classes(&self, class: &ClassKey) -> Result<impl Iterator<Item = &ClassKey>> {
        self.get_class(class)
            .map(|c| c.parents())
            .ok_or_else(|| Error::InvalidReference(class.to_string()))
    }

    /// Total number of parent relations across all classes
    pub fn relation_count(&self) -> usize {
        self.files
            .values()
            .flat_map(|f| f.classes.iter())
            .map(|c| c.parents.len())
            .sum()
    }

    // ========== Cascading Deletion ==========

    /// Remove the file at `path` together with every class it declares and
    /// every parent relation incident to any of those classes, as child or
    /// as parent, regardless of which file the other endpoint lives in.
    ///
    /// Fails with `FileNotFound` before touching anything if the path is
    /// absent; after that the cascade cannot fail, so no partial state is
    /// ever observable. Classes in other files that lose all their edges
    /// stay registered.
    pub fn remove_file_and_depending_content(&mut self, path: &str) -> Result<()> {
        let file = self
            .files
            .remove(path)
            .ok_or_else(|| Error::FileNotFound(path.to_string()))?;

        // Edges where a removed class is the child vanish with the file;
        // edges where it is the parent are scrubbed from every survivor.
        for other in self.files.values_mut() {
            for class in other.classes.iter_mut() {
                class.remove_parents_in_file(path);
            }
        }

        tracing::debug!(
            "Removed {} and {} classes declared in it",
            path,
            file.classes.len()
        );
        Ok(())
    }

    /// Summary counters for this database
    pub fn stats(&self) -> DbStats {
        DbStats {
            files: self.file_count(),
            classes: self.class_count(),
            relations: self.relation_count(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub files: usize,
    pub classes: usize,
    pub relations: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Classes: {}", self.classes)?;
        writeln!(f, "  Relations: {}", self.relations)
    }
}

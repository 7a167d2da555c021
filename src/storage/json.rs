//! JSON document-store backend

use super::{FileRecord, RelationRecord, Snapshot, StorageBackend};
use crate::file::FileKind;
use crate::Result;
use std::path::{Path, PathBuf};

/// Embedded document store keeping the whole graph in one JSON file.
///
/// Puts and deletes mutate an in-memory working copy; `flush` serializes
/// the document and replaces the target file through a same-directory
/// temp file and rename, so a concurrent reader of the location sees
/// either the old document or the new one, never a partial write.
pub struct JsonStore {
    path: PathBuf,
    document: Snapshot,
}

impl JsonStore {
    /// Open a document file (starts empty if it doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let document = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Snapshot::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }
}

impl StorageBackend for JsonStore {
    fn put_file(&mut self, path: &str, kind: FileKind) -> Result<()> {
        match self.document.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.kind = kind,
            None => self.document.files.push(FileRecord {
                path: path.to_string(),
                kind,
            }),
        }
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<()> {
        self.document.files.retain(|f| f.path != path);
        Ok(())
    }

    fn put_class(&mut self, file_path: &str, name: &str) -> Result<()> {
        let exists = self
            .document
            .classes
            .iter()
            .any(|c| c.file_path == file_path && c.name == name);
        if !exists {
            self.document.classes.push(super::ClassRecord {
                file_path: file_path.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn delete_class(&mut self, file_path: &str, name: &str) -> Result<()> {
        self.document
            .classes
            .retain(|c| !(c.file_path == file_path && c.name == name));
        Ok(())
    }

    fn put_parent_relation(&mut self, relation: &RelationRecord) -> Result<()> {
        if !self.document.relations.contains(relation) {
            self.document.relations.push(relation.clone());
        }
        Ok(())
    }

    fn delete_parent_relation(&mut self, relation: &RelationRecord) -> Result<()> {
        self.document.relations.retain(|r| r != relation);
        Ok(())
    }

    fn load_all(&mut self) -> Result<Snapshot> {
        Ok(self.document.clone())
    }

    fn flush(&mut self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.document)?;

        // Replace atomically: readers see the old or the new document
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

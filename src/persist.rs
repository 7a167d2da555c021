//! Persistence controller - moving a database in and out of a backend
//!
//! [`write_database`] makes the backend match the in-memory state exactly:
//! stale records are physically removed and live ones upserted, so a prior
//! file removal leaves nothing behind. [`read_database`] rebuilds an
//! equivalent database from a backend snapshot, re-linking everything by
//! durable (path, name) keys. A written-then-reopened database always
//! compares equal to the original, for any backend kind.
//!
//! A backend failure during a write propagates to the caller and leaves the
//! in-memory database untouched; the backend may then lag behind memory
//! until the caller retries the write.

use crate::database::Database;
use crate::storage::{open_backend, BackendKind, RelationRecord, StorageBackend};
use crate::Result;
use std::collections::HashSet;
use std::path::Path;

/// Push the full in-memory state through the backend, replacing whatever
/// the location held before, then flush.
pub fn write_database(db: &Database, backend: &mut dyn StorageBackend) -> Result<()> {
    let existing = backend.load_all()?;

    let live_files: HashSet<&str> = db.files().map(|f| f.path.as_str()).collect();
    let live_relations: HashSet<RelationRecord> = db
        .files()
        .flat_map(|f| f.classes())
        .flat_map(|c| {
            let child = c.key();
            c.parents()
                .map(move |p| RelationRecord::new(&child, p))
                .collect::<Vec<_>>()
        })
        .collect();

    // Remove stale records first, leaves before roots
    for relation in &existing.relations {
        if !live_relations.contains(relation) {
            backend.delete_parent_relation(relation)?;
        }
    }
    for class in &existing.classes {
        if !db.has_class(&class.key()) {
            backend.delete_class(&class.file_path, &class.name)?;
        }
    }
    for file in &existing.files {
        if !live_files.contains(file.path.as_str()) {
            backend.delete_file(&file.path)?;
        }
    }

    // Then upsert everything currently registered
    for file in db.files() {
        backend.put_file(&file.path, file.kind)?;
        for class in file.classes() {
            backend.put_class(&file.path, &class.name)?;
            let child = class.key();
            for parent in class.parents() {
                backend.put_parent_relation(&RelationRecord::new(&child, parent))?;
            }
        }
    }

    backend.flush()?;

    let stats = db.stats();
    tracing::debug!(
        "Wrote {} files, {} classes, {} relations",
        stats.files,
        stats.classes,
        stats.relations
    );
    Ok(())
}

/// Reconstruct a database from the backend's current persisted state.
///
/// Identities are re-established from (path) and (path, name) keys. A
/// persisted relation naming a class that is not in the snapshot is
/// rejected as an invalid reference rather than silently dropped.
pub fn read_database(backend: &mut dyn StorageBackend) -> Result<Database> {
    let snapshot = backend.load_all()?;
    let mut db = Database::new();

    for file in &snapshot.files {
        db.get_or_add_file(&file.path, file.kind);
    }
    for class in &snapshot.classes {
        db.get_or_add_class(&class.file_path, &class.name)?;
    }
    for relation in &snapshot.relations {
        db.add_parent_relation(&relation.child(), &relation.parent())?;
    }

    tracing::debug!(
        "Loaded {} files, {} classes, {} relations",
        snapshot.files.len(),
        snapshot.classes.len(),
        snapshot.relations.len()
    );
    Ok(db)
}

/// Open the backend at `path`, reconstruct the database it holds, and
/// release the handle again.
pub fn open_database(path: &Path, kind: BackendKind) -> Result<Database> {
    let mut backend = open_backend(path, kind)?;
    read_database(backend.as_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassKey;
    use crate::compare::{equals, verify_equal};
    use crate::file::FileKind;
    use crate::storage::{JsonStore, SqliteStore};
    use crate::Error;

    /// Scenario: one file, two classes, one inheritance edge
    fn single_file_graph() -> Database {
        let mut db = Database::new();
        db.get_or_add_file("a.cpp", FileKind::Implementation);
        let parent = db.get_or_add_class("a.cpp", "Parent").unwrap();
        let child = db.get_or_add_class("a.cpp", "Child").unwrap();
        db.add_parent_relation(&child, &parent).unwrap();
        db
    }

    /// Scenario: edge crossing from child.cpp into parent.h
    fn cross_file_graph() -> Database {
        let mut db = Database::new();
        db.get_or_add_file("parent.h", FileKind::Header);
        db.get_or_add_file("child.cpp", FileKind::Implementation);
        let parent = db.get_or_add_class("parent.h", "Parent").unwrap();
        let child = db.get_or_add_class("child.cpp", "Child").unwrap();
        db.add_parent_relation(&child, &parent).unwrap();
        db
    }

    #[test]
    fn test_roundtrip_sqlite() {
        let db = single_file_graph();
        let mut store = SqliteStore::open_in_memory().unwrap();

        write_database(&db, &mut store).unwrap();
        let reopened = read_database(&mut store).unwrap();

        assert_eq!(reopened.file_count(), 1);
        assert_eq!(reopened.class_count(), 2);
        assert_eq!(reopened.relation_count(), 1);
        verify_equal(&db, &reopened).unwrap();
    }

    #[test]
    fn test_roundtrip_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let db = cross_file_graph();

        let mut store = JsonStore::open(&path).unwrap();
        write_database(&db, &mut store).unwrap();

        let reopened = open_database(&path, BackendKind::Json).unwrap();
        assert!(equals(&db, &reopened));

        // The cross-file edge survived the round trip
        let child = ClassKey::new("child.cpp", "Child");
        let parents: Vec<ClassKey> = reopened.parent_classes(&child).unwrap().cloned().collect();
        assert_eq!(parents, vec![ClassKey::new("parent.h", "Parent")]);
    }

    #[test]
    fn test_roundtrip_sqlite_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.db");
        let db = cross_file_graph();

        let mut store = SqliteStore::open(&path).unwrap();
        write_database(&db, &mut store).unwrap();
        drop(store);

        let reopened = open_database(&path, BackendKind::Sqlite).unwrap();
        assert!(equals(&db, &reopened));
    }

    #[test]
    fn test_cross_backend_equality() {
        let dir = tempfile::tempdir().unwrap();
        let sqlite_path = dir.path().join("graph.db");
        let json_path = dir.path().join("graph.json");
        let db = cross_file_graph();

        for (path, kind) in [
            (&sqlite_path, BackendKind::Sqlite),
            (&json_path, BackendKind::Json),
        ] {
            let mut backend = open_backend(path, kind).unwrap();
            write_database(&db, backend.as_mut()).unwrap();
        }

        let from_sqlite = open_database(&sqlite_path, BackendKind::Sqlite).unwrap();
        let from_json = open_database(&json_path, BackendKind::Json).unwrap();

        verify_equal(&from_sqlite, &from_json).unwrap();
        verify_equal(&db, &from_sqlite).unwrap();
    }

    #[test]
    fn test_remove_then_write_leaves_empty_backend() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut db = single_file_graph();

        write_database(&db, &mut store).unwrap();
        db.remove_file_and_depending_content("a.cpp").unwrap();
        write_database(&db, &mut store).unwrap();

        // No orphaned rows of any kind remain
        assert!(store.load_all().unwrap().is_empty());
        let reopened = read_database(&mut store).unwrap();
        assert!(equals(&reopened, &Database::new()));
    }

    #[test]
    fn test_write_removes_stale_records_selectively() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut db = cross_file_graph();

        write_database(&db, &mut store).unwrap();
        db.remove_file_and_depending_content("parent.h").unwrap();
        write_database(&db, &mut store).unwrap();

        let snap = store.load_all().unwrap();
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files[0].path, "child.cpp");
        assert_eq!(snap.classes.len(), 1);
        assert!(snap.relations.is_empty());
    }

    #[test]
    fn test_rebuild_rejects_dangling_relation() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put_file("a.cpp", FileKind::Implementation).unwrap();
        store.put_class("a.cpp", "Child").unwrap();
        store
            .put_parent_relation(&RelationRecord::new(
                &ClassKey::new("a.cpp", "Child"),
                &ClassKey::new("gone.h", "Ghost"),
            ))
            .unwrap();
        store.flush().unwrap();

        let err = read_database(&mut store).unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
    }

    #[test]
    fn test_open_database_empty_location() {
        let dir = tempfile::tempdir().unwrap();
        for kind in BackendKind::all() {
            let path = dir.path().join(format!("empty.{}", kind));
            let db = open_database(&path, *kind).unwrap();
            assert!(db.is_empty());
        }
    }

    #[test]
    fn test_idempotent_rewrite_keeps_equality() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let db = single_file_graph();

        write_database(&db, &mut store).unwrap();
        write_database(&db, &mut store).unwrap();

        let reopened = read_database(&mut store).unwrap();
        assert!(equals(&db, &reopened));
        assert_eq!(store.load_all().unwrap().classes.len(), 2);
    }
}

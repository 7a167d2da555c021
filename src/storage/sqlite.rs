//! SQLite storage backend

use super::{ClassRecord, FileRecord, RelationRecord, Snapshot, StorageBackend};
use crate::file::FileKind;
use crate::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;

use super::schema;

/// Relational backend storing the graph in three SQLite tables.
///
/// Mutations accumulate in one transaction that is opened lazily on the
/// first put or delete and committed by `flush`, so another reader of the
/// same database file never observes a half-written replace pass. Dropping
/// the store without flushing rolls the pending writes back.
pub struct SqliteStore {
    conn: Connection,
    in_tx: bool,
}

impl SqliteStore {
    /// Open a database file (creates if it doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn, in_tx: false };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, in_tx: false };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    fn ensure_transaction(&mut self) -> Result<()> {
        if !self.in_tx {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.in_tx = true;
        }
        Ok(())
    }

    fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
        let path: String = row.get(0)?;
        let kind_str: String = row.get(1)?;

        let kind = FileKind::from_str(&kind_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(FileRecord { path, kind })
    }
}

impl StorageBackend for SqliteStore {
    fn put_file(&mut self, path: &str, kind: FileKind) -> Result<()> {
        self.ensure_transaction()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO files (path, kind) VALUES (?1, ?2)",
            params![path, kind.as_str()],
        )?;
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<()> {
        self.ensure_transaction()?;
        self.conn
            .execute("DELETE FROM files WHERE path = ?1", [path])?;
        Ok(())
    }

    fn put_class(&mut self, file_path: &str, name: &str) -> Result<()> {
        self.ensure_transaction()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO classes (file_path, name) VALUES (?1, ?2)",
            params![file_path, name],
        )?;
        Ok(())
    }

    fn delete_class(&mut self, file_path: &str, name: &str) -> Result<()> {
        self.ensure_transaction()?;
        self.conn.execute(
            "DELETE FROM classes WHERE file_path = ?1 AND name = ?2",
            params![file_path, name],
        )?;
        Ok(())
    }

    fn put_parent_relation(&mut self, relation: &RelationRecord) -> Result<()> {
        self.ensure_transaction()?;
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO parent_relations
                (child_file_path, child_name, parent_file_path, parent_name)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                relation.child_file_path,
                relation.child_name,
                relation.parent_file_path,
                relation.parent_name,
            ],
        )?;
        Ok(())
    }

    fn delete_parent_relation(&mut self, relation: &RelationRecord) -> Result<()> {
        self.ensure_transaction()?;
        self.conn.execute(
            r#"
            DELETE FROM parent_relations
            WHERE child_file_path = ?1 AND child_name = ?2
              AND parent_file_path = ?3 AND parent_name = ?4
            "#,
            params![
                relation.child_file_path,
                relation.child_name,
                relation.parent_file_path,
                relation.parent_name,
            ],
        )?;
        Ok(())
    }

    fn load_all(&mut self) -> Result<Snapshot> {
        let mut stmt = self.conn.prepare("SELECT path, kind FROM files")?;
        let files = stmt
            .query_map([], Self::row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare("SELECT file_path, name FROM classes")?;
        let classes = stmt
            .query_map([], |row| {
                Ok(ClassRecord {
                    file_path: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT child_file_path, child_name, parent_file_path, parent_name FROM parent_relations",
        )?;
        let relations = stmt
            .query_map([], |row| {
                Ok(RelationRecord {
                    child_file_path: row.get(0)?,
                    child_name: row.get(1)?,
                    parent_file_path: row.get(2)?,
                    parent_name: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Snapshot {
            files,
            classes,
            relations,
        })
    }

    fn flush(&mut self) -> Result<()> {
        if self.in_tx {
            self.conn.execute_batch("COMMIT")?;
            self.in_tx = false;
        }
        Ok(())
    }
}

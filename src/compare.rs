//! Equality engine - order-independent structural comparison
//!
//! Two databases are equal iff their file sets match on (path, kind), the
//! class sets within matched files match on name, and the parent-relation
//! edge sets match under the (file path, class name) identity. Comparison
//! goes through a canonical form: files sorted by path, classes sorted by
//! name, parent edges sorted by (parent file path, parent name). This makes
//! the verdict independent of insertion order and of whichever backend
//! produced either database.

use crate::class::ClassKey;
use crate::database::Database;
use crate::file::FileKind;
use crate::{Error, Result};

/// A file in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFile {
    pub path: String,
    pub kind: FileKind,
    pub classes: Vec<CanonicalClass>,
}

/// A class in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalClass {
    pub name: String,
    pub parents: Vec<ClassKey>,
}

/// Compute the canonical form of a database.
///
/// Deterministic for a given graph regardless of how it was built.
pub fn canonical(db: &Database) -> Vec<CanonicalFile> {
    let mut files: Vec<CanonicalFile> = db
        .files()
        .map(|file| {
            let mut classes: Vec<CanonicalClass> = file
                .classes()
                .map(|class| {
                    let mut parents: Vec<ClassKey> = class.parents().cloned().collect();
                    parents.sort();
                    CanonicalClass {
                        name: class.name.clone(),
                        parents,
                    }
                })
                .collect();
            classes.sort_by(|a, b| a.name.cmp(&b.name));
            CanonicalFile {
                path: file.path.clone(),
                kind: file.kind,
                classes,
            }
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Structural equality between two databases.
///
/// Symmetric and reflexive; insensitive to insertion order and backend
/// identity, sensitive to any missing, extra, or retargeted file, class,
/// or edge.
pub fn equals(a: &Database, b: &Database) -> bool {
    canonical(a) == canonical(b)
}

/// Strict comparison: `Ok(())` when equal, otherwise `Error::Mismatch`
/// describing the first structural divergence found.
pub fn verify_equal(a: &Database, b: &Database) -> Result<()> {
    let ca = canonical(a);
    let cb = canonical(b);

    for fa in &ca {
        if !cb.iter().any(|f| f.path == fa.path) {
            return Err(Error::Mismatch(format!(
                "file {} missing from second database",
                fa.path
            )));
        }
    }
    for fb in &cb {
        if !ca.iter().any(|f| f.path == fb.path) {
            return Err(Error::Mismatch(format!(
                "file {} missing from first database",
                fb.path
            )));
        }
    }

    // Identical path sets, both sorted: walk in lockstep
    for (fa, fb) in ca.iter().zip(cb.iter()) {
        if fa.kind != fb.kind {
            return Err(Error::Mismatch(format!(
                "file {} is {} in first database but {} in second",
                fa.path, fa.kind, fb.kind
            )));
        }

        for class in &fa.classes {
            if !fb.classes.iter().any(|c| c.name == class.name) {
                return Err(Error::Mismatch(format!(
                    "class {} missing from second database",
                    ClassKey::new(&fa.path, &class.name)
                )));
            }
        }
        for class in &fb.classes {
            if !fa.classes.iter().any(|c| c.name == class.name) {
                return Err(Error::Mismatch(format!(
                    "class {} missing from first database",
                    ClassKey::new(&fb.path, &class.name)
                )));
            }
        }

        for (class_a, class_b) in fa.classes.iter().zip(fb.classes.iter()) {
            let child = ClassKey::new(&fa.path, &class_a.name);
            for parent in &class_a.parents {
                if !class_b.parents.contains(parent) {
                    return Err(Error::Mismatch(format!(
                        "parent relation {} -> {} missing from second database",
                        child, parent
                    )));
                }
            }
            for parent in &class_b.parents {
                if !class_a.parents.contains(parent) {
                    return Err(Error::Mismatch(format!(
                        "parent relation {} -> {} missing from first database",
                        child, parent
                    )));
                }
            }
        }
    }

    Ok(())
}

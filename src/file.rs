//! Source file entities
//!
//! A [`SourceFile`] is the root of ownership in the graph: it owns the
//! classes declared in it, in insertion order, and removing it removes them.

use crate::class::{Class, ClassKey};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a source file: implementation unit or header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Translation unit (.c, .cpp, .cc, ...)
    Implementation,
    /// Header file (.h, .hpp, and anything unrecognized)
    Header,
}

impl FileKind {
    /// Get the string representation of the file kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Implementation => "implementation",
            FileKind::Header => "header",
        }
    }

    /// Get all file kinds
    pub fn all() -> &'static [FileKind] {
        &[FileKind::Implementation, FileKind::Header]
    }

    /// Classify a path by its extension.
    ///
    /// Extensionless paths classify as headers, matching how system headers
    /// like `<vector>` appear in include directives.
    pub fn from_path(path: &str) -> FileKind {
        match path.rsplit_once('.') {
            Some((_, ext)) => match ext.to_lowercase().as_str() {
                "c" | "cc" | "cp" | "cpp" | "cxx" | "c++" => FileKind::Implementation,
                _ => FileKind::Header,
            },
            None => FileKind::Header,
        }
    }
}

impl FromStr for FileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "implementation" | "impl" | "source" | "cpp" => Ok(FileKind::Implementation),
            "header" | "hpp" => Ok(FileKind::Header),
            _ => Err(Error::Parse(format!("Unknown file kind: {}", s))),
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source file and the classes it declares.
///
/// Classes are kept in insertion order; their names are unique within the
/// file and form the durable identity `(path, name)` together with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Normalized file path, unique within a database
    pub path: String,
    /// Implementation or header
    pub kind: FileKind,
    /// Classes declared in this file, in insertion order
    pub(crate) classes: Vec<Class>,
}

impl SourceFile {
    /// Create a new empty source file
    pub fn new(path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
            classes: Vec::new(),
        }
    }

    /// Classes declared in this file, in insertion order
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    /// Look up a declared class by name
    pub fn get_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub(crate) fn get_class_mut(&mut self, name: &str) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| c.name == name)
    }

    /// Identity keys of all classes declared in this file
    pub fn class_keys(&self) -> Vec<ClassKey> {
        self.classes.iter().map(|c| c.key()).collect()
    }
}

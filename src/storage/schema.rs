//! SQLite schema definitions

/// SQL to create the files table
pub const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    kind TEXT NOT NULL
)
"#;

/// SQL to create the classes table
pub const CREATE_CLASSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS classes (
    file_path TEXT NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (file_path, name)
)
"#;

/// SQL to create the parent_relations table
pub const CREATE_PARENT_RELATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS parent_relations (
    child_file_path TEXT NOT NULL,
    child_name TEXT NOT NULL,
    parent_file_path TEXT NOT NULL,
    parent_name TEXT NOT NULL,
    PRIMARY KEY (child_file_path, child_name, parent_file_path, parent_name)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_classes_file ON classes(file_path)",
    "CREATE INDEX IF NOT EXISTS idx_relations_child ON parent_relations(child_file_path, child_name)",
    "CREATE INDEX IF NOT EXISTS idx_relations_parent ON parent_relations(parent_file_path, parent_name)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_FILES_TABLE,
        CREATE_CLASSES_TABLE,
        CREATE_PARENT_RELATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

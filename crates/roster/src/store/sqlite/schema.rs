//! `SQLite` schema definitions for the sqlite backend.

/// SQL statement to create the records table.
///
/// `seq` carries insertion order; `id` is the stable identifier exposed to
/// callers.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age > 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_RECORDS_TABLE, CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_records_table_contains_required_columns() {
        assert!(CREATE_RECORDS_TABLE.contains("seq INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(CREATE_RECORDS_TABLE.contains("id TEXT NOT NULL UNIQUE"));
        assert!(CREATE_RECORDS_TABLE.contains("name TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("email TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("age INTEGER NOT NULL"));
    }
}

//! `SQLite` backend for roster.
//!
//! Persists records to a local database file so separate invocations of the
//! CLI see the same list. Insertion order is kept by an autoincrement `seq`
//! column that updates never touch.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Backend, UpdateOutcome};
use crate::config::BackendKind;
use crate::error::{Error, Result};
use crate::record::{NewRecord, Record, RecordId, RecordRef};

/// Record backend stored in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        Ok(Record {
            id: RecordId::new(row.get::<_, String>(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            age: row.get(3)?,
        })
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name, email, age FROM records ORDER BY seq ASC")?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn create(&self, data: &NewRecord) -> Result<Record> {
        let record = Record::from_new(RecordId::generate(), data.clone());
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO records (id, name, email, age) VALUES (?1, ?2, ?3, ?4)",
            params![record.id.as_str(), record.name, record.email, record.age],
        )?;
        debug!(id = %record.id, seq = conn.last_insert_rowid(), "Inserted record");
        Ok(record)
    }

    async fn update(&self, id: &RecordId, data: &NewRecord) -> Result<UpdateOutcome> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            r"
            UPDATE records SET name = ?2, email = ?3, age = ?4, updated_at = datetime('now')
            WHERE id = ?1
            ",
            params![id.as_str(), data.name, data.email, data.age],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(RecordRef::Id(id.clone())));
        }
        Ok(UpdateOutcome::Applied)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM records WHERE id = ?1", [id.as_str()])?;
        if affected == 0 {
            return Err(Error::NotFound(RecordRef::Id(id.clone())));
        }
        Ok(())
    }
}

//! Record store for roster.
//!
//! [`RecordStore`] owns the ordered, in-memory list of records that front
//! ends render from. Every mutation is first confirmed by a pluggable
//! [`Backend`] and only then applied locally, so a failed backend call leaves
//! the list exactly as it was.
//!
//! Backends:
//! - [`MemoryBackend`]: lives as long as the process.
//! - [`SqliteBackend`]: a local database file.
//! - [`RemoteBackend`]: a record server over HTTP.

pub mod memory;
pub mod remote;
pub mod sqlite;

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{BackendKind, Config};
use crate::error::{Error, Result};
use crate::record::{NewRecord, Record, RecordId, RecordRef};

pub use memory::MemoryBackend;
pub use remote::{RemoteBackend, RemoteOptions};
pub use sqlite::SqliteBackend;

/// What the store should do after a backend accepted an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The update is final; replace the record in place.
    Applied,
    /// Reload the whole list from the backend.
    Refetch,
}

/// Persistence behind a [`RecordStore`].
///
/// Backends are addressed by identifier only; resolving list positions is the
/// store's job.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Which kind of backend this is.
    fn kind(&self) -> BackendKind;

    /// Fetch every record in insertion order.
    async fn fetch_all(&self) -> Result<Vec<Record>>;

    /// Persist a new record and return it with its identifier.
    async fn create(&self, data: &NewRecord) -> Result<Record>;

    /// Replace the content of an existing record.
    async fn update(&self, id: &RecordId, data: &NewRecord) -> Result<UpdateOutcome>;

    /// Delete an existing record.
    async fn delete(&self, id: &RecordId) -> Result<()>;
}

/// Ordered record collection backed by a [`Backend`].
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    backend: Box<dyn Backend>,
}

impl RecordStore {
    /// Create an empty store over the given backend without loading it.
    #[must_use]
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            records: Vec::new(),
            backend,
        }
    }

    /// Create a store and load its initial contents from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn open(backend: Box<dyn Backend>) -> Result<Self> {
        let mut store = Self::new(backend);
        store.load().await?;
        Ok(store)
    }

    /// Which kind of backend this store persists to.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Current records in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the reference does not resolve.
    pub fn get(&self, target: &RecordRef) -> Result<&Record> {
        self.index_of(target).map(|index| &self.records[index])
    }

    /// Resolve a reference to its current list position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the reference does not resolve.
    pub fn index_of(&self, target: &RecordRef) -> Result<usize> {
        let found = match target {
            RecordRef::Index(index) => (*index < self.records.len()).then_some(*index),
            RecordRef::Id(id) => self.records.iter().position(|r| &r.id == id),
        };
        found.ok_or_else(|| Error::NotFound(target.clone()))
    }

    /// Replace local state with the backend's full list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read; local state is kept.
    pub async fn load(&mut self) -> Result<()> {
        let records = self.backend.fetch_all().await.inspect_err(|e| {
            warn!(backend = %self.backend.kind(), error = %e, "Failed to load records");
        })?;
        info!(
            backend = %self.backend.kind(),
            count = records.len(),
            "Loaded records"
        );
        self.records = records;
        Ok(())
    }

    /// Append a record.
    ///
    /// The returned record is the backend's copy, carrying its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the record; local state is kept.
    pub async fn add(&mut self, data: NewRecord) -> Result<Record> {
        let record = self.backend.create(&data).await.inspect_err(|e| {
            warn!(error = %e, "Backend rejected new record");
        })?;
        debug!(id = %record.id, "Added record");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Replace the content of the referenced record, keeping its position.
    ///
    /// When the backend asks for a reload, local state becomes the backend's
    /// list. The returned record is what the backend accepted, even if the
    /// reloaded list no longer contains it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the reference does not resolve, or the
    /// backend's error if it rejects the update; local state is kept.
    pub async fn update(&mut self, target: &RecordRef, data: NewRecord) -> Result<Record> {
        let index = self.index_of(target)?;
        let id = self.records[index].id.clone();

        let outcome = self.backend.update(&id, &data).await.inspect_err(|e| {
            warn!(id = %id, error = %e, "Backend rejected update");
        })?;

        if outcome == UpdateOutcome::Refetch {
            match self.backend.fetch_all().await {
                Ok(records) => {
                    debug!(id = %id, count = records.len(), "Reloaded records after update");
                    self.records = records;
                    if let Ok(record) = self.get(&RecordRef::Id(id.clone())) {
                        return Ok(record.clone());
                    }
                    // Removed elsewhere after our update landed.
                    warn!(id = %id, "Updated record missing from reloaded list");
                    return Ok(Record::from_new(id, data));
                }
                Err(e) => {
                    // The update itself was confirmed; fall back to applying it here.
                    warn!(id = %id, error = %e, "Reload after update failed");
                }
            }
        }

        let record = Record::from_new(id, data);
        debug!(id = %record.id, index, "Updated record");
        self.records[index] = record.clone();
        Ok(record)
    }

    /// Delete the referenced record and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the reference does not resolve, or the
    /// backend's error if it rejects the delete; local state is kept.
    pub async fn remove(&mut self, target: &RecordRef) -> Result<Record> {
        let index = self.index_of(target)?;
        let id = &self.records[index].id;

        self.backend.delete(id).await.inspect_err(|e| {
            warn!(id = %id, error = %e, "Backend rejected delete");
        })?;

        let record = self.records.remove(index);
        debug!(id = %record.id, index, "Removed record");
        Ok(record)
    }
}

/// Build the backend selected by configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialised (database cannot be
/// opened, HTTP client cannot be built).
pub fn open_backend(config: &Config) -> Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match config.store.backend {
        BackendKind::Memory => Box::new(MemoryBackend::new()),
        BackendKind::Sqlite => Box::new(SqliteBackend::open(config.database_path())?),
        BackendKind::Remote => Box::new(RemoteBackend::new(RemoteOptions::from(config))?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(name: &str, age: u32) -> NewRecord {
        NewRecord {
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            age,
        }
    }

    async fn store_with(names: &[&str]) -> RecordStore {
        let mut store = RecordStore::new(Box::new(MemoryBackend::new()));
        for (i, name) in names.iter().enumerate() {
            store.add(data(name, u32::try_from(i).unwrap() + 20)).await.unwrap();
        }
        store
    }

    fn names(store: &RecordStore) -> Vec<&str> {
        store.list().iter().map(|r| r.name.as_str()).collect()
    }

    /// Backend that fails every call.
    #[derive(Debug)]
    struct BrokenBackend;

    #[async_trait]
    impl Backend for BrokenBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        async fn fetch_all(&self) -> Result<Vec<Record>> {
            Err(Error::RemoteStatus {
                operation: "list",
                status: 503,
            })
        }

        async fn create(&self, _data: &NewRecord) -> Result<Record> {
            Err(Error::RemoteStatus {
                operation: "create",
                status: 503,
            })
        }

        async fn update(&self, _id: &RecordId, _data: &NewRecord) -> Result<UpdateOutcome> {
            Err(Error::RemoteStatus {
                operation: "update",
                status: 503,
            })
        }

        async fn delete(&self, _id: &RecordId) -> Result<()> {
            Err(Error::RemoteStatus {
                operation: "delete",
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_add_appends_at_tail() {
        let mut store = store_with(&["Ann", "Bo"]).await;
        let before: Vec<Record> = store.list().to_vec();

        let added = store.add(data("Cy", 40)).await.unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(&store.list()[..2], &before[..]);
        assert_eq!(store.list()[2], added);
    }

    #[tokio::test]
    async fn test_update_by_index_keeps_other_positions() {
        let mut store = store_with(&["Ann", "Bo", "Cy"]).await;
        let before: Vec<Record> = store.list().to_vec();

        let updated = store
            .update(&RecordRef::Index(1), data("Bob", 33))
            .await
            .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(updated.id, before[1].id);
        assert_eq!(store.list()[1], updated);
        assert_eq!(store.list()[0], before[0]);
        assert_eq!(store.list()[2], before[2]);
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let mut store = store_with(&["Ann", "Bo"]).await;
        let id = store.list()[0].id.clone();

        store
            .update(&RecordRef::Id(id.clone()), data("Ann B", 31))
            .await
            .unwrap();

        assert_eq!(store.get(&RecordRef::Id(id)).unwrap().name, "Ann B");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut store = store_with(&["Ann"]).await;

        let err = store
            .update(&RecordRef::Index(5), data("X", 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .update(&RecordRef::Id(RecordId::new("nope")), data("X", 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(names(&store), vec!["Ann"]);
    }

    #[tokio::test]
    async fn test_remove_shifts_and_second_remove_fails() {
        let mut store = store_with(&["Ann", "Bo", "Cy"]).await;
        let bo = store.list()[1].clone();

        let removed = store.remove(&RecordRef::Index(1)).await.unwrap();

        assert_eq!(removed, bo);
        assert_eq!(names(&store), vec!["Ann", "Cy"]);

        let err = store.remove(&RecordRef::Id(bo.id)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_last_then_same_index_fails() {
        let mut store = store_with(&["Ann"]).await;

        store.remove(&RecordRef::Index(0)).await.unwrap();
        assert!(store.is_empty());

        let err = store.remove(&RecordRef::Index(0)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_loads_backend_contents() {
        let backend = MemoryBackend::new();
        backend.create(&data("Ann", 30)).await.unwrap();
        backend.create(&data("Bo", 31)).await.unwrap();

        let store = RecordStore::open(Box::new(backend)).await.unwrap();
        assert_eq!(names(&store), vec!["Ann", "Bo"]);
        assert_eq!(store.backend_kind(), BackendKind::Memory);
    }

    /// Accepts updates but reloads to an empty list, as if another client
    /// deleted everything right after.
    #[derive(Debug)]
    struct EmptyingBackend;

    #[async_trait]
    impl Backend for EmptyingBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        async fn fetch_all(&self) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }

        async fn create(&self, data: &NewRecord) -> Result<Record> {
            Ok(Record::from_new(RecordId::generate(), data.clone()))
        }

        async fn update(&self, _id: &RecordId, _data: &NewRecord) -> Result<UpdateOutcome> {
            Ok(UpdateOutcome::Refetch)
        }

        async fn delete(&self, _id: &RecordId) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_update_accepted_but_gone_after_reload() {
        let mut store = RecordStore::new(Box::new(EmptyingBackend));
        store.records.push(Record::from_new(RecordId::new("a1"), data("Ann", 30)));

        let updated = store
            .update(&RecordRef::Index(0), data("Ann B", 31))
            .await
            .unwrap();

        assert_eq!(updated, Record::from_new(RecordId::new("a1"), data("Ann B", 31)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_backend_leaves_state_untouched() {
        let mut store = RecordStore::new(Box::new(BrokenBackend));
        store.records.push(Record::from_new(RecordId::new("r1"), data("Ann", 30)));
        let before = store.list().to_vec();

        assert!(store.add(data("Bo", 31)).await.is_err());
        assert!(store
            .update(&RecordRef::Index(0), data("Ann B", 31))
            .await
            .is_err());
        assert!(store.remove(&RecordRef::Index(0)).await.is_err());
        assert!(store.load().await.is_err());

        assert_eq!(store.list(), &before[..]);
    }

    #[test]
    fn test_open_backend_memory() {
        let mut config = Config::default();
        config.store.backend = BackendKind::Memory;

        let backend = open_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Memory);
    }

    #[test]
    fn test_open_backend_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.database_path = Some(dir.path().join("nested").join("records.db"));

        let backend = open_backend(&config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sqlite);
        assert!(dir.path().join("nested").join("records.db").exists());
    }
}

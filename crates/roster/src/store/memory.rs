//! Process-lifetime backend.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Backend, UpdateOutcome};
use crate::config::BackendKind;
use crate::error::{Error, Result};
use crate::record::{NewRecord, Record, RecordId, RecordRef};

/// Keeps records in memory; identifiers are generated UUIDs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<Record>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn fetch_all(&self) -> Result<Vec<Record>> {
        Ok(self.records.lock().await.clone())
    }

    async fn create(&self, data: &NewRecord) -> Result<Record> {
        let record = Record::from_new(RecordId::generate(), data.clone());
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, data: &NewRecord) -> Result<UpdateOutcome> {
        let mut records = self.records.lock().await;
        let slot = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::NotFound(RecordRef::Id(id.clone())))?;
        *slot = Record::from_new(id.clone(), data.clone());
        Ok(UpdateOutcome::Applied)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| Error::NotFound(RecordRef::Id(id.clone())))?;
        records.remove(index);
        Ok(())
    }
}

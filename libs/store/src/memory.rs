use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use probe_api::{ReportRecord, ReportStore, StoreError};

/// In-memory store. Для harness'ов и сценариев, где durability поверх
/// процесса не нужна; семантика ключей та же, что у файлового.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<u64, ReportRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Количество сохранённых записей.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl ReportStore for MemoryStore {
    fn put(
        &self,
        record: &ReportRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let record = record.clone();
        Box::pin(async move {
            // Last-write-wins по ключу.
            self.records.write().await.insert(record.id, record);
            Ok(())
        })
    }

    fn get(
        &self,
        sequence_id: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReportRecord, StoreError>> + Send + '_>> {
        Box::pin(async move {
            self.records
                .read()
                .await
                .get(&sequence_id)
                .cloned()
                .ok_or(StoreError::NotFound(sequence_id))
        })
    }
}

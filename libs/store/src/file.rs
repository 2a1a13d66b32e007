use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use probe_api::{ReportRecord, ReportStore, StoreError};

/// Файловый store: одна запись — один `<seq>.json` в report-директории.
///
/// Конкурентные `put` безопасны для разных ключей (разные файлы);
/// повторная запись того же ключа перезаписывает файл целиком.
#[derive(Clone)]
pub struct FileStore {
    report_dir: PathBuf,
}

impl FileStore {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    fn record_path(&self, sequence_id: u64) -> PathBuf {
        self.report_dir.join(format!("{sequence_id}.json"))
    }

    fn do_put(&self, record: &ReportRecord) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.report_dir).map_err(|e| StoreError::Write {
            seq: record.id,
            reason: format!("mkdir {}: {e}", self.report_dir.display()),
        })?;

        let payload = serde_json::to_string(record).map_err(|e| StoreError::Write {
            seq: record.id,
            reason: format!("json serialize: {e}"),
        })?;

        let path = self.record_path(record.id);
        std::fs::write(&path, payload).map_err(|e| StoreError::Write {
            seq: record.id,
            reason: format!("write {}: {e}", path.display()),
        })?;

        tracing::debug!(seq = record.id, path = %path.display(), "report record written");
        Ok(())
    }

    fn do_get(&self, sequence_id: u64) -> Result<ReportRecord, StoreError> {
        let path = self.record_path(sequence_id);
        let payload = match std::fs::read_to_string(&path) {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(sequence_id));
            }
            Err(e) => {
                return Err(StoreError::Corrupt {
                    seq: sequence_id,
                    reason: format!("read {}: {e}", path.display()),
                });
            }
        };

        serde_json::from_str(&payload).map_err(|e| StoreError::Corrupt {
            seq: sequence_id,
            reason: format!("json parse: {e}"),
        })
    }
}

impl ReportStore for FileStore {
    fn put(
        &self,
        record: &ReportRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let record = record.clone();
        Box::pin(async move { self.do_put(&record) })
    }

    fn get(
        &self,
        sequence_id: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReportRecord, StoreError>> + Send + '_>> {
        Box::pin(async move { self.do_get(sequence_id) })
    }
}

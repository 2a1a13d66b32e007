use std::future::Future;
use std::pin::Pin;

use crate::error::StoreError;
use crate::types::ReportRecord;

/// Keyed durable store для report-записей; ключ — sequence id.
///
/// Backing medium непрозрачен для pipeline'а: файлы, память, БД —
/// любое durable key-value хранилище, выполняющее контракт.
///
/// `put` обязан быть безопасным при конкурентных вызовах для разных
/// ключей (`&self` + внутренняя синхронизация): transport может
/// доставлять сообщения не по порядку и параллельно. Повторный `put`
/// того же ключа — last-write-wins.
pub trait ReportStore: Send + Sync {
    /// Сохранить запись под ключом `record.id`.
    fn put(
        &self,
        record: &ReportRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Прочитать запись по sequence id.
    ///
    /// `NotFound` — записи нет; `Corrupt` — payload не декодируется.
    fn get(
        &self,
        sequence_id: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReportRecord, StoreError>> + Send + '_>>;
}

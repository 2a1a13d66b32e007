/// Ошибки кодека сообщений.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Тело сообщения не является парой `"<seq>:<micros>"`.
    /// Сообщение отбрасывается, listener продолжает работу.
    #[error("malformed message body '{body}': {reason}")]
    Malformed { body: String, reason: String },
}

/// Ошибки report store.
///
/// `Write` — транзиентная, per-message: listener логирует и продолжает.
/// `NotFound` / `Corrupt` — фатальные для агрегации: без всех N записей
/// отчёт не строится.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no report record for sequence {0}")]
    NotFound(u64),

    #[error("report record {seq} is corrupt: {reason}")]
    Corrupt { seq: u64, reason: String },

    #[error("store write for sequence {seq}: {reason}")]
    Write { seq: u64, reason: String },
}

/// Ошибки транспортной границы.
///
/// `Connect` и `Subscribe` фатальны для сессии; `Publish` — per-message,
/// логируется, batch продолжается.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport connect: {0}")]
    Connect(String),

    #[error("publish on '{channel}': {reason}")]
    Publish { channel: String, reason: String },

    #[error("subscribe on '{channel}': {reason}")]
    Subscribe { channel: String, reason: String },

    #[error("transport closed")]
    Closed,
}

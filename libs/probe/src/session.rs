use std::time::Duration;

use crate::error::ProbeError;

pub const DEFAULT_BATCH_SIZE: u64 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 5;
pub const DEFAULT_LISTEN_WINDOW_SECS: u64 = 30;

/// Эфемерный контекст одной probe-сессии (publish или subscribe).
///
/// Явная per-invocation конфигурация вместо process-wide состояния;
/// не персистится, живёт только на время вызова.
#[derive(Debug, Clone)]
pub struct Session {
    pub channel: String,
    pub event: String,
    /// Тег сессии; в отчёте listener'а фигурирует client id отправителя.
    pub client_id: String,
    /// Сообщений в batch'е; sequence id = `0..batch_size`.
    pub batch_size: u64,
    /// Пауза между сообщениями publisher'а.
    pub delay: Duration,
    /// Окно прослушивания listener'а.
    pub listen_window: Duration,
}

impl Session {
    pub fn new(
        channel: impl Into<String>,
        event: impl Into<String>,
        client_id: impl Into<String>,
        batch_size: u64,
        delay: Duration,
        listen_window: Duration,
    ) -> Result<Self, ProbeError> {
        let channel = channel.into();
        let event = event.into();
        if channel.is_empty() {
            return Err(ProbeError::Config("channel must not be empty".into()));
        }
        if event.is_empty() {
            return Err(ProbeError::Config("event must not be empty".into()));
        }
        if batch_size == 0 {
            return Err(ProbeError::Config("batch size must be positive".into()));
        }
        Ok(Self {
            channel,
            event,
            client_id: client_id.into(),
            batch_size,
            delay,
            listen_window,
        })
    }
}

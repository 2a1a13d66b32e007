use std::future::Future;
use std::pin::Pin;

use crate::error::TransportError;

/// Входящее сообщение подписки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Тело сообщения (wire-формат кодека).
    pub body: String,
    /// Client id отправителя — как его сообщил transport.
    pub client_id: String,
}

/// Realtime pub/sub transport (consumed boundary).
///
/// Семантика доставки (at-most-once, ordering) — контракт конкретного
/// transport'а, здесь не воспроизводится. Реализации: loopback-bus
/// (in-process, тесты) и relay-transport (TCP relay клиент).
pub trait Transport: Send + Sync {
    /// Опубликовать тело на `(channel, event)`.
    fn publish(
        &self,
        channel: &str,
        event: &str,
        body: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>>;

    /// Подписаться на `(channel, event)`. `buffer` — размер канала
    /// доставки; при переполнении transport дропает сообщение с warn.
    fn subscribe(
        &self,
        channel: &str,
        event: &str,
        buffer: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Subscription>, TransportError>> + Send + '_>>;
}

/// Активная подписка — асинхронный поток входящих сообщений.
pub trait Subscription: Send {
    /// Следующее сообщение. `None` = transport закрыт.
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<Inbound>> + Send + '_>>;

    /// Детерминированно освободить подписку. После `close` доставка
    /// прекращается; сообщения, пришедшие позже, не наблюдаются.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl std::fmt::Debug for dyn Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subscription")
    }
}

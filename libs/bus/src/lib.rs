use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use probe_api::{Inbound, Subscription, Transport, TransportError};

// ═══════════════════════════════════════════════════════════════
//  LoopbackBus — in-process pub/sub hub
// ═══════════════════════════════════════════════════════════════

type EventKey = (String, String);

/// In-process pub/sub hub: fan-out по `(channel, event)` в mpsc-каналы
/// подписчиков. Доставляет сообщения немедленно и по порядку —
/// hermetic-замена внешнего realtime transport'а для тестов pipeline'а.
#[derive(Default)]
pub struct LoopbackBus {
    subscribers: RwLock<HashMap<EventKey, Vec<mpsc::Sender<Inbound>>>>,
}

impl LoopbackBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Клиент шины с собственным client id. Каждая сессия
    /// (publisher, listener) держит своего клиента.
    pub fn client(self: &Arc<Self>, client_id: impl Into<String>) -> LoopbackClient {
        LoopbackClient {
            bus: Arc::clone(self),
            client_id: client_id.into(),
        }
    }

    /// Число активных подписок на `(channel, event)`. Для harness'ов,
    /// которым нужно дождаться регистрации listener'а перед publish'ем.
    pub async fn subscriber_count(&self, channel: &str, event: &str) -> usize {
        let key = (channel.to_string(), event.to_string());
        self.subscribers
            .read()
            .await
            .get(&key)
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }

    async fn fan_out(&self, key: &EventKey, inbound: Inbound) {
        let mut subs = self.subscribers.write().await;
        let Some(senders) = subs.get_mut(key) else {
            return; // нет подписчиков — сообщение просто теряется
        };

        let mut i = 0;
        while i < senders.len() {
            if senders[i].is_closed() {
                senders.swap_remove(i);
                continue;
            }
            match senders[i].try_send(inbound.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(channel = %key.0, event = %key.1, "subscriber full, dropping");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    senders.swap_remove(i);
                    continue;
                }
            }
            i += 1;
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  LoopbackClient — Transport impl
// ═══════════════════════════════════════════════════════════════

pub struct LoopbackClient {
    bus: Arc<LoopbackBus>,
    client_id: String,
}

impl Transport for LoopbackClient {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        body: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        let key = (channel.to_string(), event.to_string());
        let inbound = Inbound {
            body: body.to_string(),
            client_id: self.client_id.clone(),
        };
        Box::pin(async move {
            self.bus.fan_out(&key, inbound).await;
            Ok(())
        })
    }

    fn subscribe(
        &self,
        channel: &str,
        event: &str,
        buffer: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Subscription>, TransportError>> + Send + '_>>
    {
        let key = (channel.to_string(), event.to_string());
        Box::pin(async move {
            let (tx, rx) = mpsc::channel(buffer);
            self.bus
                .subscribers
                .write()
                .await
                .entry(key)
                .or_default()
                .push(tx);
            Ok(Box::new(LoopbackSubscription { rx }) as Box<dyn Subscription>)
        })
    }
}

pub struct LoopbackSubscription {
    rx: mpsc::Receiver<Inbound>,
}

impl Subscription for LoopbackSubscription {
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<Inbound>> + Send + '_>> {
        Box::pin(async { self.rx.recv().await })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        // Закрытый receiver вычищается из fan-out при следующем publish.
        self.rx.close();
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_matching_subscription() {
        let bus = LoopbackBus::new();
        let publisher = bus.client("pub");
        let listener = bus.client("sub");

        let mut sub = listener.subscribe("bench", "tick", 8).await.unwrap();
        publisher.publish("bench", "tick", "0:100").await.unwrap();

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.body, "0:100");
        assert_eq!(msg.client_id, "pub");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = LoopbackBus::new();
        bus.client("pub").publish("bench", "tick", "x").await.unwrap();
    }

    #[tokio::test]
    async fn other_event_not_delivered() {
        let bus = LoopbackBus::new();
        let mut sub = bus.client("s").subscribe("bench", "tick", 8).await.unwrap();
        bus.client("p").publish("bench", "other", "0:1").await.unwrap();
        bus.client("p").publish("bench", "tick", "1:2").await.unwrap();
        assert_eq!(sub.recv().await.unwrap().body, "1:2");
    }

    #[tokio::test]
    async fn closed_subscription_stops_receiving() {
        let bus = LoopbackBus::new();
        let mut sub = bus.client("s").subscribe("bench", "tick", 8).await.unwrap();
        sub.close().await;
        bus.client("p").publish("bench", "tick", "0:1").await.unwrap();
        assert_eq!(sub.recv().await, None);
    }
}

//! TCP-клиент relay-брокера.
//!
//! Протокол: newline-delimited JSON-фреймы поверх одного TCP-соединения,
//! тег `op`:
//!
//! ```text
//! → {"op":"auth","key":"…","client":"…"}
//! ← {"op":"ok"} | {"op":"err","reason":"…"}
//! → {"op":"sub","channel":"…","event":"…"}
//! → {"op":"unsub","channel":"…","event":"…"}
//! → {"op":"pub","channel":"…","event":"…","body":"…"}
//! ← {"op":"msg","channel":"…","event":"…","body":"…","client":"…"}
//! ```
//!
//! Сам брокер — внешний collaborator; его гарантии доставки здесь
//! не воспроизводятся. Клиент мультиплексирует подписки одного
//! соединения: background reader раскладывает `msg`-фреймы по
//! mpsc-каналам подписок. На каждый `(channel, event)` допускается
//! одна активная подписка; повторный `subscribe` без закрытия
//! предыдущей — ошибка.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use probe_api::{Inbound, Subscription, Transport, TransportError};

// ═══════════════════════════════════════════════════════════════
//  Wire frames
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Frame {
    Auth {
        key: String,
        client: String,
    },
    #[serde(rename = "ok")]
    AuthOk,
    #[serde(rename = "err")]
    RelayErr {
        reason: String,
    },
    Sub {
        channel: String,
        event: String,
    },
    Unsub {
        channel: String,
        event: String,
    },
    Pub {
        channel: String,
        event: String,
        body: String,
    },
    Msg {
        channel: String,
        event: String,
        body: String,
        client: String,
    },
}

// ═══════════════════════════════════════════════════════════════
//  RelayTransport
// ═══════════════════════════════════════════════════════════════

type EventKey = (String, String);

#[derive(Debug)]
struct Shared {
    writer: Mutex<OwnedWriteHalf>,
    subs: RwLock<HashMap<EventKey, mpsc::Sender<Inbound>>>,
}

impl Shared {
    async fn send_frame(&self, frame: &Frame) -> std::io::Result<()> {
        let mut line = serde_json::to_string(frame).map_err(std::io::Error::other)?;
        line.push('\n');
        let mut w = self.writer.lock().await;
        w.write_all(line.as_bytes()).await
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Адрес брокера, `host:port`.
    pub addr: String,
    /// Ключ аутентификации (`LATENCY_KEY`). Пустой ключ брокер отвергает.
    pub key: String,
    /// Client id сессии — тег в `msg`-фреймах получателям.
    pub client_id: String,
}

#[derive(Debug)]
pub struct RelayTransport {
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl RelayTransport {
    /// Соединиться и аутентифицироваться. Отказ по ключу или обрыв
    /// рукопожатия — фатальный `Connect`.
    pub async fn connect(cfg: &RelayConfig) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(&cfg.addr).await.map_err(|e| {
            TransportError::Connect(format!("TCP connect to {}: {e}", cfg.addr))
        })?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let shared = Arc::new(Shared {
            writer: Mutex::new(write_half),
            subs: RwLock::new(HashMap::new()),
        });

        shared
            .send_frame(&Frame::Auth {
                key: cfg.key.clone(),
                client: cfg.client_id.clone(),
            })
            .await
            .map_err(|e| TransportError::Connect(format!("auth send: {e}")))?;

        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .await
            .map_err(|e| TransportError::Connect(format!("auth reply: {e}")))?;
        if n == 0 {
            return Err(TransportError::Connect(
                "connection closed during auth".to_string(),
            ));
        }
        match serde_json::from_str::<Frame>(line.trim_end()) {
            Ok(Frame::AuthOk) => {}
            Ok(Frame::RelayErr { reason }) => {
                return Err(TransportError::Connect(format!("auth rejected: {reason}")));
            }
            Ok(_) => {
                return Err(TransportError::Connect(
                    "unexpected frame during auth".to_string(),
                ));
            }
            Err(e) => return Err(TransportError::Connect(format!("bad auth reply: {e}"))),
        }
        tracing::info!(addr = %cfg.addr, client = %cfg.client_id, "relay connected");

        let reader_task = tokio::spawn(read_loop(reader, Arc::clone(&shared)));
        Ok(Self {
            shared,
            reader: reader_task,
        })
    }
}

impl Drop for RelayTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Background reader: раскладывает входящие `msg` по подпискам.
async fn read_loop(mut reader: BufReader<OwnedReadHalf>, shared: Arc<Shared>) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "relay read error");
                break;
            }
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Frame>(trimmed) {
            Ok(Frame::Msg {
                channel,
                event,
                body,
                client,
            }) => {
                let key = (channel, event);
                let subs = shared.subs.read().await;
                if let Some(tx) = subs.get(&key) {
                    match tx.try_send(Inbound {
                        body,
                        client_id: client,
                    }) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::warn!(channel = %key.0, event = %key.1, "subscription full, dropping");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {}
                    }
                }
            }
            Ok(Frame::RelayErr { reason }) => {
                tracing::warn!(%reason, "relay error frame");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "bad relay frame");
            }
        }
    }
    // Дропаем sender'ы: recv() подписок вернёт None.
    shared.subs.write().await.clear();
    tracing::info!("relay connection closed");
}

impl Transport for RelayTransport {
    fn publish(
        &self,
        channel: &str,
        event: &str,
        body: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        let frame = Frame::Pub {
            channel: channel.to_string(),
            event: event.to_string(),
            body: body.to_string(),
        };
        let channel = channel.to_string();
        Box::pin(async move {
            self.shared
                .send_frame(&frame)
                .await
                .map_err(|e| TransportError::Publish {
                    channel,
                    reason: e.to_string(),
                })
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
            {
                let mut subs = self.shared.subs.write().await;
                if subs.contains_key(&key) {
                    return Err(TransportError::Subscribe {
                        channel: key.0,
                        reason: format!("already subscribed to event {}", key.1),
                    });
                }
                subs.insert(key.clone(), tx);
            }

            let frame = Frame::Sub {
                channel: key.0.clone(),
                event: key.1.clone(),
            };
            if let Err(e) = self.shared.send_frame(&frame).await {
                self.shared.subs.write().await.remove(&key);
                return Err(TransportError::Subscribe {
                    channel: key.0,
                    reason: e.to_string(),
                });
            }

            Ok(Box::new(RelaySubscription {
                key,
                rx,
                shared: Arc::clone(&self.shared),
            }) as Box<dyn Subscription>)
        })
    }
}

pub struct RelaySubscription {
    key: EventKey,
    rx: mpsc::Receiver<Inbound>,
    shared: Arc<Shared>,
}

impl Subscription for RelaySubscription {
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<Inbound>> + Send + '_>> {
        Box::pin(async { self.rx.recv().await })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {
            let frame = Frame::Unsub {
                channel: self.key.0.clone(),
                event: self.key.1.clone(),
            };
            if let Err(e) = self.shared.send_frame(&frame).await {
                tracing::warn!(channel = %self.key.0, error = %e, "unsub send failed");
            }
            self.shared.subs.write().await.remove(&self.key);
            self.rx.close();
        })
    }
}

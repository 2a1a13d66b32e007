use tokio_util::sync::CancellationToken;

use probe_api::{Transport, codec, now_micros};

use crate::session::Session;

/// Publisher loop: `batch_size` sequence-stamped сообщений с паузой
/// `delay` между ними, sequence id строго возрастает.
///
/// Неудачный publish логируется и не прерывает batch (доставка — контракт
/// transport'а, ретраев здесь нет). Отмена токена завершает batch на
/// ближайшей паузе. Возвращает число успешно опубликованных сообщений.
pub async fn run(session: &Session, transport: &dyn Transport, token: &CancellationToken) -> u64 {
    let mut published = 0u64;

    for seq in 0..session.batch_size {
        let sent_micros = now_micros();
        let body = codec::encode(seq, sent_micros);

        match transport.publish(&session.channel, &session.event, &body).await {
            Ok(()) => {
                published += 1;
                tracing::info!(
                    channel = %session.channel,
                    event = %session.event,
                    client = %session.client_id,
                    data = %body,
                    "published message"
                );
            }
            Err(e) => {
                tracing::error!(
                    channel = %session.channel,
                    event = %session.event,
                    seq,
                    error = %e,
                    "publish failed"
                );
            }
        }

        // Пауза не нужна после последнего сообщения.
        if seq + 1 < session.batch_size {
            tokio::select! {
                () = tokio::time::sleep(session.delay) => {}
                () = token.cancelled() => {
                    tracing::info!(channel = %session.channel, "publish cancelled");
                    break;
                }
            }
        }
    }

    published
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use probe_api::{Subscription, TransportError};

    use super::*;

    /// Transport, у которого publish с номером `fail_call` падает.
    struct FlakyTransport {
        calls: AtomicUsize,
        fail_call: usize,
    }

    impl FlakyTransport {
        fn failing_on(fail_call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_call,
            }
        }
    }

    impl Transport for FlakyTransport {
        fn publish(
            &self,
            channel: &str,
            _event: &str,
            _body: &str,
        ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let res = if n == self.fail_call {
                Err(TransportError::Publish {
                    channel: channel.to_string(),
                    reason: "relay unavailable".to_string(),
                })
            } else {
                Ok(())
            };
            Box::pin(async move { res })
        }

        fn subscribe(
            &self,
            _channel: &str,
            _event: &str,
            _buffer: usize,
        ) -> Pin<
            Box<dyn Future<Output = Result<Box<dyn Subscription>, TransportError>> + Send + '_>,
        > {
            unimplemented!("publisher never subscribes")
        }
    }

    fn session() -> Session {
        Session::new("bench", "tick", "c", 3, Duration::ZERO, Duration::ZERO).unwrap()
    }

    #[tokio::test]
    async fn failed_publish_does_not_abort_batch() {
        let transport = FlakyTransport::failing_on(1);
        let published = run(&session(), &transport, &CancellationToken::new()).await;
        // Все три сообщения отправлялись, неудачное не засчитано.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(published, 2);
    }

    #[tokio::test]
    async fn failed_first_publish_still_runs_whole_batch() {
        let transport = FlakyTransport::failing_on(0);
        let published = run(&session(), &transport, &CancellationToken::new()).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(published, 2);
    }
}

use tokio_util::sync::CancellationToken;

use probe_api::{Inbound, ReportRecord, ReportStore, Transport, codec, now_micros};

use crate::error::ProbeError;
use crate::session::Session;

/// Буфер mpsc-канала подписки.
const SUBSCRIBE_BUFFER: usize = 64;

/// Subscriber listener: Idle → Listening (subscribe) → Draining
/// (окно истекло или отмена) → Stopped (подписка закрыта).
///
/// Ошибка subscribe фатальна. Дальше в течение `listen_window` каждое
/// входящее сообщение декодируется, получает arrival timestamp и
/// персистится как `ReportRecord`; per-message ошибки (malformed body,
/// неудачная запись) логируются и не прерывают прослушивание. После
/// окна подписка освобождается независимо от числа принятых сообщений;
/// опоздавшие сообщения не наблюдаются.
///
/// Возвращает число записанных report-записей.
pub async fn run(
    session: &Session,
    transport: &dyn Transport,
    store: &dyn ReportStore,
    token: &CancellationToken,
) -> Result<u64, ProbeError> {
    let mut sub = transport
        .subscribe(&session.channel, &session.event, SUBSCRIBE_BUFFER)
        .await?;

    tracing::info!(
        channel = %session.channel,
        event = %session.event,
        client = %session.client_id,
        window_secs = session.listen_window.as_secs(),
        "listening for messages"
    );

    let window = tokio::time::sleep(session.listen_window);
    tokio::pin!(window);

    let mut recorded = 0u64;
    loop {
        tokio::select! {
            () = &mut window => {
                tracing::info!(channel = %session.channel, "listen window elapsed, draining");
                break;
            }
            () = token.cancelled() => {
                tracing::info!(channel = %session.channel, "listener cancelled, draining");
                break;
            }
            inbound = sub.recv() => {
                match inbound {
                    Some(msg) => {
                        if handle_message(session, store, &msg).await {
                            recorded += 1;
                        }
                    }
                    None => {
                        tracing::warn!(channel = %session.channel, "transport closed before window elapsed");
                        break;
                    }
                }
            }
        }
    }

    sub.close().await;
    tracing::info!(channel = %session.channel, recorded, "listener stopped");
    Ok(recorded)
}

/// Скоррелировать одно входящее сообщение и записать его в store.
/// `false` = сообщение отброшено (malformed) или запись не удалась.
async fn handle_message(session: &Session, store: &dyn ReportStore, msg: &Inbound) -> bool {
    let decoded = match codec::decode(&msg.body) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(channel = %session.channel, error = %e, "discarding malformed message");
            return false;
        }
    };

    let received_micros = now_micros();
    let record = ReportRecord::correlate(
        &session.channel,
        &msg.client_id,
        decoded.sequence_id,
        decoded.sent_micros,
        received_micros,
    );

    tracing::info!(
        channel = %record.channel,
        client = %record.client,
        id = record.id,
        sent = record.sent,
        received = record.received,
        delay = record.delay,
        "received message"
    );

    if let Err(e) = store.put(&record).await {
        tracing::error!(id = record.id, error = %e, "store write failed");
        return false;
    }
    true
}

pub mod publish;
pub mod subscribe;

use tokio_util::sync::CancellationToken;

use probe::{NameGenerator, Session};
use probe_api::env_or;
use relay_transport::{RelayConfig, RelayTransport};

use crate::config::Effective;
use crate::error::LatencyError;

/// Ключ аутентификации relay-брокера. Пустое значение по умолчанию:
/// transport тогда не пройдёт auth — фатально для сессии.
const KEY_ENV: &str = "LATENCY_KEY";

/// Собрать сессию и соединиться с брокером; Ctrl-C отменяет токен.
pub(crate) async fn setup(
    eff: &Effective,
) -> Result<(Session, RelayTransport, CancellationToken), LatencyError> {
    let client_id = NameGenerator::new(eff.seed).generate();

    let session = Session::new(
        eff.channel.clone(),
        eff.event.clone(),
        client_id.clone(),
        eff.batch,
        eff.delay,
        eff.window,
    )?;

    let transport = RelayTransport::connect(&RelayConfig {
        addr: eff.relay.clone(),
        key: env_or(KEY_ENV, ""),
        client_id,
    })
    .await?;

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    Ok((session, transport, token))
}

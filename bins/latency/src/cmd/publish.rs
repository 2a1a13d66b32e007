use probe::publisher;

use crate::config::Effective;
use crate::error::LatencyError;

pub async fn run(eff: &Effective) -> Result<(), LatencyError> {
    let (session, transport, token) = super::setup(eff).await?;

    tracing::info!(
        channel = %session.channel,
        event = %session.event,
        client = %session.client_id,
        batch = session.batch_size,
        delay_secs = session.delay.as_secs(),
        "publishing batch"
    );

    let sent = publisher::run(&session, &transport, &token).await;
    tracing::info!(sent, "publish batch finished");
    Ok(())
}

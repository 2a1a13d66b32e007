use probe::{aggregate, listener};
use report_store::FileStore;

use crate::config::Effective;
use crate::error::LatencyError;

pub async fn run(eff: &Effective) -> Result<(), LatencyError> {
    let (session, transport, token) = super::setup(eff).await?;
    let store = FileStore::new(&eff.report_dir);

    let recorded = listener::run(&session, &transport, &store, &token).await?;
    tracing::info!(recorded, "listen window closed");

    tracing::info!(
        channel = %session.channel,
        client = %session.client_id,
        "generating latency report"
    );
    // Любая отсутствующая/битая запись фатальна: таблицы не будет,
    // её отсутствие и есть сигнал неполного batch'а.
    let report = aggregate(&store, session.batch_size).await?;
    print!("{}", report.render());
    Ok(())
}

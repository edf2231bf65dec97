use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::controllers::paste;
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let count = paste::purge_expired(&app, Utc::now()).await?;
    info!("purge finished, {count} expired pastes deleted");
    Ok(())
}

/// Sweep expired pastes every `period`, forever. Failures are logged and
/// retried on the next tick.
pub async fn run_periodically(app: App, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(err) = paste::purge_expired(&app, Utc::now()).await {
            warn!("periodic purge failed: {err:?}");
        }
    }
}

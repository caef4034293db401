//! Periodic cleanup of expired "seen update" entries.

use std::sync::Arc;
use std::time::Duration;

use chatlink_core::clock::Clock;
use chatlink_db::UpdateLog;
use tokio_util::sync::CancellationToken;

/// How often the purge runs.
const PURGE_INTERVAL: Duration = Duration::from_secs(600); // 10 minutes

/// Run the purge loop until `cancel` is triggered.
pub async fn run(updates: Arc<dyn UpdateLog>, clock: Arc<dyn Clock>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Update log purge job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Update log purge job stopping");
                break;
            }
            _ = interval.tick() => {
                match updates.purge_expired(clock.now()).await {
                    Ok(0) => tracing::debug!("Update log purge: nothing expired"),
                    Ok(purged) => tracing::info!(purged, "Update log purge: removed expired entries"),
                    Err(e) => tracing::error!(error = %e, "Update log purge failed"),
                }
            }
        }
    }
}

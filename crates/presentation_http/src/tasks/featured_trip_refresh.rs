//! Periodic featured-trip price refresh
//!
//! Re-prices the published trips with the latest tariff snapshot, so that
//! provider-side route changes show up without a tariff update.

use std::{sync::Arc, time::Duration};

use application::{FeaturedTripRefresher, TariffService};
use tracing::{debug, error, info, warn};

/// Spawn a task refreshing featured trips every `interval`.
///
/// The first run happens one interval after startup. Returns a `JoinHandle`
/// that can be used to abort the task when shutting down.
pub fn spawn_featured_trip_refresh_task(
    tariffs: Arc<TariffService>,
    refresher: Arc<FeaturedTripRefresher>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        interval_secs = interval.as_secs(),
        "Starting featured trip refresh task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            debug!("Running scheduled featured trip refresh");

            let tariff = match tariffs.current().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    error!(error = %e, "Failed to load tariff for scheduled refresh");
                    continue;
                },
            };

            match refresher.refresh_all(&tariff.config).await {
                Ok(report) if report.is_clean() => {
                    debug!(trips = report.total(), "Scheduled refresh finished");
                },
                Ok(report) => warn!(
                    failed = report.failed.len(),
                    succeeded = report.succeeded.len(),
                    "Scheduled refresh finished with failures"
                ),
                Err(e) => error!(error = %e, "Scheduled refresh could not run"),
            }
        }
    })
}

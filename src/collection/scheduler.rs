use super::{CollectionReport, MetricManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Runs one collection and logs the outcome instead of returning it.
/// Failures are also sent to Sentry when it is configured.
pub async fn collect_and_log(manager: &MetricManager) -> Option<CollectionReport> {
    match manager.collect_all().await {
        Ok(report) => {
            for failure in &report.failures {
                sentry::capture_message(
                    &format!(
                        "Failed to collect metric {}: {}",
                        failure.metric_slug, failure.error
                    ),
                    sentry::Level::Warning,
                );
            }
            Some(report)
        }
        Err(err) => {
            error!("Metric collection failed: {:#}", err);
            sentry::integrations::anyhow::capture_anyhow(&err);
            None
        }
    }
}

/// Spawns the periodic collection loop.
///
/// The first collection happens immediately when `collect_on_startup` is
/// set, otherwise after one full period.
pub fn spawn_collection_loop(
    manager: Arc<MetricManager>,
    period: Duration,
    collect_on_startup: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !collect_on_startup {
            // The first tick completes immediately
            interval.tick().await;
        }
        info!("Collecting metrics every {:?}", period);

        loop {
            interval.tick().await;
            collect_and_log(&manager).await;
        }
    })
}

//! The collection workflow: creating metrics against the registry and
//! gathering one new sample per collectible metric.

use crate::datamodel::{
    Dashboard, DatumSample, DbagDateTime, DbagDateTimeExt, Metric, MetricDisplay, NewDashboard,
    NewMetric,
};
use crate::metric_types::{MetricError, MetricType, MetricTypeRegistry};
use crate::storage::StorageInstance;
use anyhow::Result;
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod report;
pub mod scheduler;

pub use report::{CollectedSample, CollectionFailure, CollectionReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Upper bound for one metric type to gather one sample.
    pub timeout: Duration,
    /// How many metrics are collected at the same time.
    pub concurrency: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricManager {
    registry: Arc<MetricTypeRegistry>,
    storage: Arc<dyn StorageInstance>,
    options: CollectOptions,
}

impl MetricManager {
    pub fn new(registry: Arc<MetricTypeRegistry>, storage: Arc<dyn StorageInstance>) -> Self {
        Self {
            registry,
            storage,
            options: CollectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CollectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &MetricTypeRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &Arc<dyn StorageInstance> {
        &self.storage
    }

    pub fn options(&self) -> CollectOptions {
        self.options
    }

    fn resolve(&self, label: &str) -> Result<Arc<dyn MetricType>, MetricError> {
        self.registry
            .resolve(label)
            .ok_or_else(|| MetricError::metric_type_not_found(label))
    }

    /// Creates a metric for a registered metric type.
    ///
    /// The slug is derived from the label when none is given. Nothing is
    /// stored if the metric type is unknown, a field is invalid, or the
    /// metric type rejects the properties.
    pub async fn create_metric(&self, new_metric: NewMetric) -> Result<Metric> {
        let metric_type = self.resolve(&new_metric.metric_type_label)?;
        new_metric.validate().map_err(MetricError::from)?;
        metric_type
            .validate_properties(&new_metric.metric_properties)
            .map_err(|e| MetricError::InvalidProperties {
                label: new_metric.metric_type_label.clone(),
                reason: e.to_string(),
            })?;

        let metric = self.storage.insert_metric(&new_metric).await?;
        info!("Created metric {}", metric);
        Ok(metric)
    }

    pub async fn create_dashboard(&self, new_dashboard: NewDashboard) -> Result<Dashboard> {
        new_dashboard.validate().map_err(MetricError::from)?;
        let dashboard = self.storage.insert_dashboard(&new_dashboard).await?;
        info!("Created dashboard {}", dashboard.slug);
        Ok(dashboard)
    }

    pub async fn update_metric_display(&self, metric: &Metric, display: &MetricDisplay) -> Result<()> {
        display.validate().map_err(MetricError::from)?;
        self.storage.update_metric_display(metric.id, display).await
    }

    /// Gathers one sample for the metric and stores it.
    pub async fn collect_metric(&self, metric: &Metric) -> Result<DatumSample> {
        let metric_type = self.resolve(&metric.metric_type_label)?;

        let value = tokio::time::timeout(
            self.options.timeout,
            metric_type.gather_data_sample(metric),
        )
        .await
        .map_err(|_| MetricError::CollectionTimeout {
            slug: metric.slug.clone(),
            timeout: self.options.timeout,
        })??;

        let sample = self
            .storage
            .insert_sample(metric.id, DbagDateTime::now_utc()?, value)
            .await?;
        debug!("Collected {} = {}", metric.slug, value);
        Ok(sample)
    }

    /// Collects every metric with `do_collect` set.
    ///
    /// Metrics are collected independently: a failing metric is logged and
    /// reported, the others are still collected. Only failing to list the
    /// metrics fails the whole run.
    pub async fn collect_all(&self) -> Result<CollectionReport> {
        let metrics = self.storage.list_collectible_metrics().await?;
        info!("Collecting {} metrics", metrics.len());

        let outcomes: Vec<(String, Result<DatumSample>)> = stream::iter(metrics)
            .map(|metric| async move {
                let outcome = self.collect_metric(&metric).await;
                (metric.slug, outcome)
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut report = CollectionReport::default();
        for (metric_slug, outcome) in outcomes {
            match outcome {
                Ok(sample) => report.collected.push(CollectedSample {
                    metric_slug,
                    sample,
                }),
                Err(error) => {
                    warn!("Failed to collect metric {}: {:#}", metric_slug, error);
                    report.failures.push(CollectionFailure {
                        metric_slug,
                        error: format!("{:#}", error),
                    });
                }
            }
        }

        info!(
            "Collection done: {} collected, {} failed",
            report.collected.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// The most recent sample of the metric, `None` before the first collection.
    pub async fn latest_sample(&self, metric: &Metric) -> Result<Option<DatumSample>> {
        self.storage.latest_sample(metric.id).await
    }
}

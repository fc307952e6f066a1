use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

use crate::datamodel::{
    Dashboard, DashboardPanel, DatumSample, DbagDateTime, Metric, MetricDisplay, NewDashboard,
    NewMetric, PanelMetric, PanelOptions,
};

#[async_trait]
pub trait StorageInstance: Send + Sync + Debug {
    async fn create_or_migrate(&self) -> Result<()>;

    /// Health check for the storage backend
    /// Returns Ok(()) if the storage is healthy and can accept queries
    async fn health_check(&self) -> Result<()>;

    /// Runs a query returning a single integer, used by SQL metric types.
    async fn query_scalar(&self, sql: &str) -> Result<i64>;

    // Metrics
    async fn insert_metric(&self, metric: &NewMetric) -> Result<Metric>;
    async fn get_metric(&self, metric_id: i64) -> Result<Option<Metric>>;
    async fn get_metric_by_slug(&self, slug: &str) -> Result<Option<Metric>>;
    async fn list_metrics(&self) -> Result<Vec<Metric>>;
    /// Metrics with `do_collect` set, in id order.
    async fn list_collectible_metrics(&self) -> Result<Vec<Metric>>;
    async fn set_metric_do_collect(&self, metric_id: i64, do_collect: bool) -> Result<()>;
    async fn update_metric_display(&self, metric_id: i64, display: &MetricDisplay) -> Result<()>;
    /// Also deletes the samples of the metric and its panels.
    async fn delete_metric(&self, metric_id: i64) -> Result<()>;

    // Samples
    async fn insert_sample(
        &self,
        metric_id: i64,
        utc_timestamp: DbagDateTime,
        value: i64,
    ) -> Result<DatumSample>;
    async fn latest_sample(&self, metric_id: i64) -> Result<Option<DatumSample>>;
    /// Most recent first.
    async fn list_samples(&self, metric_id: i64, limit: Option<usize>)
    -> Result<Vec<DatumSample>>;
    async fn count_samples(&self, metric_id: i64) -> Result<i64>;

    // Dashboards
    async fn insert_dashboard(&self, dashboard: &NewDashboard) -> Result<Dashboard>;
    async fn get_dashboard_by_slug(&self, slug: &str) -> Result<Option<Dashboard>>;
    async fn list_dashboards(&self) -> Result<Vec<Dashboard>>;
    async fn delete_dashboard(&self, dashboard_id: i64) -> Result<()>;

    // Panels
    async fn attach_metric(
        &self,
        dashboard_id: i64,
        metric_id: i64,
        options: PanelOptions,
    ) -> Result<DashboardPanel>;
    async fn update_panel(
        &self,
        dashboard_id: i64,
        metric_id: i64,
        options: PanelOptions,
    ) -> Result<DashboardPanel>;
    async fn detach_metric(&self, dashboard_id: i64, metric_id: i64) -> Result<()>;
    /// Panels of a dashboard with their metrics, in attachment order.
    async fn list_panels(&self, dashboard_id: i64) -> Result<Vec<PanelMetric>>;
}

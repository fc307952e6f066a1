//! Row types and conversions shared by the SQL backends.

use super::StorageError;
use crate::datamodel::{
    Dashboard, DashboardPanel, DatumSample, DbagDateTime, DbagDateTimeExt, Metric,
    MetricProperties, PanelMetric,
};
use anyhow::Result;

/// Default number of samples returned when no limit is given.
pub const DEFAULT_SAMPLES_LIMIT: usize = 1000;

#[derive(Debug, sqlx::FromRow)]
pub struct MetricRow {
    pub id: i64,
    pub metric_type_label: String,
    pub metric_properties: String,
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub unit_label: String,
    pub unit_label_plural: String,
    pub do_collect: bool,
}

impl TryFrom<MetricRow> for Metric {
    type Error = StorageError;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        let metric_properties: MetricProperties = serde_json::from_str(&row.metric_properties)
            .map_err(|e| {
                StorageError::invalid_data_format(
                    &format!("Failed to parse metric_properties: {}", e),
                    &format!("metric '{}'", row.slug),
                )
            })?;

        Ok(Metric {
            id: row.id,
            metric_type_label: row.metric_type_label,
            metric_properties,
            slug: row.slug,
            label: row.label,
            description: row.description,
            unit_label: row.unit_label,
            unit_label_plural: row.unit_label_plural,
            do_collect: row.do_collect,
        })
    }
}

pub fn metrics_from_rows(rows: Vec<MetricRow>) -> Result<Vec<Metric>> {
    rows.into_iter()
        .map(|row| Metric::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

pub fn properties_to_json(properties: &MetricProperties) -> Result<String> {
    Ok(serde_json::to_string(properties)?)
}

#[derive(Debug, sqlx::FromRow)]
pub struct DatumSampleRow {
    pub id: i64,
    pub metric_id: i64,
    pub utc_timestamp: i64,
    pub value: i64,
}

impl From<DatumSampleRow> for DatumSample {
    fn from(row: DatumSampleRow) -> Self {
        DatumSample {
            id: row.id,
            metric_id: row.metric_id,
            utc_timestamp: DbagDateTime::from_unix_microseconds_i64(row.utc_timestamp),
            value: row.value,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct DashboardRow {
    pub id: i64,
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
}

impl From<DashboardRow> for Dashboard {
    fn from(row: DashboardRow) -> Self {
        Dashboard {
            id: row.id,
            slug: row.slug,
            label: row.label,
            description: row.description,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct DashboardPanelRow {
    pub id: i64,
    pub metric_id: i64,
    pub dashboard_id: i64,
    pub do_display: bool,
    pub show_sparkline: bool,
}

impl From<DashboardPanelRow> for DashboardPanel {
    fn from(row: DashboardPanelRow) -> Self {
        DashboardPanel {
            id: row.id,
            metric_id: row.metric_id,
            dashboard_id: row.dashboard_id,
            do_display: row.do_display,
            show_sparkline: row.show_sparkline,
        }
    }
}

/// Panel columns are prefixed so they don't clash with the metric ones.
#[derive(Debug, sqlx::FromRow)]
pub struct PanelMetricRow {
    pub panel_id: i64,
    pub panel_dashboard_id: i64,
    pub panel_do_display: bool,
    pub panel_show_sparkline: bool,
    #[sqlx(flatten)]
    pub metric: MetricRow,
}

impl TryFrom<PanelMetricRow> for PanelMetric {
    type Error = StorageError;

    fn try_from(row: PanelMetricRow) -> Result<Self, Self::Error> {
        let metric = Metric::try_from(row.metric)?;
        Ok(PanelMetric {
            panel: DashboardPanel {
                id: row.panel_id,
                metric_id: metric.id,
                dashboard_id: row.panel_dashboard_id,
                do_display: row.panel_do_display,
                show_sparkline: row.panel_show_sparkline,
            },
            metric,
        })
    }
}

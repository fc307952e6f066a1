use crate::datamodel::{
    Dashboard, DashboardPanel, DatumSample, DbagDateTime, DbagDateTimeExt, Metric, MetricDisplay,
    NewDashboard, NewMetric, PanelMetric, PanelOptions,
};
use crate::storage::common::{
    DEFAULT_SAMPLES_LIMIT, DashboardPanelRow, DashboardRow, DatumSampleRow, MetricRow,
    PanelMetricRow, metrics_from_rows, properties_to_json,
};
use crate::storage::{StorageError, StorageInstance};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;

// PostgreSQL implementation
#[derive(Debug)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let connect_options = PgConnectOptions::from_str(connection_string)
            .context("Failed to create postgres connection options")?;

        let pool = PgPool::connect_with(connect_options)
            .await
            .context("Failed to create postgres pool")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageInstance for PostgresStorage {
    async fn create_or_migrate(&self) -> Result<()> {
        sqlx::migrate!("src/storage/postgresql/migrations")
            .run(&self.pool)
            .await
            .context("Failed to migrate database")?;

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("PostgreSQL health check failed")?;
        Ok(())
    }

    async fn query_scalar(&self, sql: &str) -> Result<i64> {
        let value: i64 = sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to run scalar query '{}'", sql))?;
        Ok(value)
    }

    async fn insert_metric(&self, metric: &NewMetric) -> Result<Metric> {
        let slug = metric.resolved_slug();
        let properties = properties_to_json(&metric.metric_properties)?;

        let row: MetricRow = sqlx::query_as(
            r#"
            INSERT INTO metrics (
                metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            "#,
        )
        .bind(&metric.metric_type_label)
        .bind(properties)
        .bind(&slug)
        .bind(&metric.label)
        .bind(&metric.description)
        .bind(&metric.unit_label)
        .bind(&metric.unit_label_plural)
        .bind(metric.do_collect)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            StorageError::from_write_error(e, || format!("metric slug '{}' already exists", slug))
        })?;

        Ok(Metric::try_from(row)?)
    }

    async fn get_metric(&self, metric_id: i64) -> Result<Option<Metric>> {
        let row: Option<MetricRow> = sqlx::query_as(
            r#"
            SELECT id, metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            FROM metrics
            WHERE id = $1
            "#,
        )
        .bind(metric_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Metric::try_from).transpose()?)
    }

    async fn get_metric_by_slug(&self, slug: &str) -> Result<Option<Metric>> {
        let row: Option<MetricRow> = sqlx::query_as(
            r#"
            SELECT id, metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            FROM metrics
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Metric::try_from).transpose()?)
    }

    async fn list_metrics(&self) -> Result<Vec<Metric>> {
        let rows: Vec<MetricRow> = sqlx::query_as(
            r#"
            SELECT id, metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            FROM metrics
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        metrics_from_rows(rows)
    }

    async fn list_collectible_metrics(&self) -> Result<Vec<Metric>> {
        let rows: Vec<MetricRow> = sqlx::query_as(
            r#"
            SELECT id, metric_type_label, metric_properties, slug, label, description,
                unit_label, unit_label_plural, do_collect
            FROM metrics
            WHERE do_collect = TRUE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        metrics_from_rows(rows)
    }

    async fn set_metric_do_collect(&self, metric_id: i64, do_collect: bool) -> Result<()> {
        let result = sqlx::query("UPDATE metrics SET do_collect = $1 WHERE id = $2")
            .bind(do_collect)
            .bind(metric_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::MetricNotFound {
                key: format!("id {}", metric_id),
            }
            .into());
        }
        Ok(())
    }

    async fn update_metric_display(&self, metric_id: i64, display: &MetricDisplay) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE metrics
            SET label = $1, description = $2, unit_label = $3, unit_label_plural = $4
            WHERE id = $5
            "#,
        )
        .bind(&display.label)
        .bind(&display.description)
        .bind(&display.unit_label)
        .bind(&display.unit_label_plural)
        .bind(metric_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::MetricNotFound {
                key: format!("id {}", metric_id),
            }
            .into());
        }
        Ok(())
    }

    async fn delete_metric(&self, metric_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM metrics WHERE id = $1")
            .bind(metric_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::MetricNotFound {
                key: format!("id {}", metric_id),
            }
            .into());
        }
        Ok(())
    }

    async fn insert_sample(
        &self,
        metric_id: i64,
        utc_timestamp: DbagDateTime,
        value: i64,
    ) -> Result<DatumSample> {
        let row: DatumSampleRow = sqlx::query_as(
            r#"
            INSERT INTO datum_samples (metric_id, utc_timestamp, value)
            VALUES ($1, $2, $3)
            RETURNING id, metric_id, utc_timestamp, value
            "#,
        )
        .bind(metric_id)
        .bind(utc_timestamp.to_unix_microseconds_i64())
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to insert sample for metric id {}", metric_id))?;

        Ok(row.into())
    }

    async fn latest_sample(&self, metric_id: i64) -> Result<Option<DatumSample>> {
        let row: Option<DatumSampleRow> = sqlx::query_as(
            r#"
            SELECT id, metric_id, utc_timestamp, value
            FROM datum_samples
            WHERE metric_id = $1
            ORDER BY utc_timestamp DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(metric_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DatumSample::from))
    }

    async fn list_samples(
        &self,
        metric_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<DatumSample>> {
        let limit = limit.unwrap_or(DEFAULT_SAMPLES_LIMIT) as i64;
        let rows: Vec<DatumSampleRow> = sqlx::query_as(
            r#"
            SELECT id, metric_id, utc_timestamp, value
            FROM datum_samples
            WHERE metric_id = $1
            ORDER BY utc_timestamp DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(metric_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DatumSample::from).collect())
    }

    async fn count_samples(&self, metric_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datum_samples WHERE metric_id = $1")
            .bind(metric_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_dashboard(&self, dashboard: &NewDashboard) -> Result<Dashboard> {
        let slug = dashboard.resolved_slug();
        let row: DashboardRow = sqlx::query_as(
            r#"
            INSERT INTO dashboards (slug, label, description)
            VALUES ($1, $2, $3)
            RETURNING id, slug, label, description
            "#,
        )
        .bind(&slug)
        .bind(&dashboard.label)
        .bind(&dashboard.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            StorageError::from_write_error(e, || {
                format!("dashboard slug '{}' already exists", slug)
            })
        })?;

        Ok(row.into())
    }

    async fn get_dashboard_by_slug(&self, slug: &str) -> Result<Option<Dashboard>> {
        let row: Option<DashboardRow> =
            sqlx::query_as("SELECT id, slug, label, description FROM dashboards WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Dashboard::from))
    }

    async fn list_dashboards(&self) -> Result<Vec<Dashboard>> {
        let rows: Vec<DashboardRow> =
            sqlx::query_as("SELECT id, slug, label, description FROM dashboards ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Dashboard::from).collect())
    }

    async fn delete_dashboard(&self, dashboard_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
            .bind(dashboard_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::DashboardNotFound {
                key: format!("id {}", dashboard_id),
            }
            .into());
        }
        Ok(())
    }

    async fn attach_metric(
        &self,
        dashboard_id: i64,
        metric_id: i64,
        options: PanelOptions,
    ) -> Result<DashboardPanel> {
        let row: DashboardPanelRow = sqlx::query_as(
            r#"
            INSERT INTO dashboard_panels (metric_id, dashboard_id, do_display, show_sparkline)
            VALUES ($1, $2, $3, $4)
            RETURNING id, metric_id, dashboard_id, do_display, show_sparkline
            "#,
        )
        .bind(metric_id)
        .bind(dashboard_id)
        .bind(options.do_display)
        .bind(options.show_sparkline)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            StorageError::from_write_error(e, || {
                format!(
                    "metric {} is already on dashboard {}",
                    metric_id, dashboard_id
                )
            })
        })?;

        Ok(row.into())
    }

    async fn update_panel(
        &self,
        dashboard_id: i64,
        metric_id: i64,
        options: PanelOptions,
    ) -> Result<DashboardPanel> {
        let row: Option<DashboardPanelRow> = sqlx::query_as(
            r#"
            UPDATE dashboard_panels
            SET do_display = $1, show_sparkline = $2
            WHERE dashboard_id = $3 AND metric_id = $4
            RETURNING id, metric_id, dashboard_id, do_display, show_sparkline
            "#,
        )
        .bind(options.do_display)
        .bind(options.show_sparkline)
        .bind(dashboard_id)
        .bind(metric_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DashboardPanel::from).ok_or_else(|| {
            StorageError::PanelNotFound {
                metric_id,
                dashboard_id,
            }
            .into()
        })
    }

    async fn detach_metric(&self, dashboard_id: i64, metric_id: i64) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM dashboard_panels WHERE dashboard_id = $1 AND metric_id = $2")
                .bind(dashboard_id)
                .bind(metric_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PanelNotFound {
                metric_id,
                dashboard_id,
            }
            .into());
        }
        Ok(())
    }

    async fn list_panels(&self, dashboard_id: i64) -> Result<Vec<PanelMetric>> {
        let rows: Vec<PanelMetricRow> = sqlx::query_as(
            r#"
            SELECT
                p.id AS panel_id,
                p.dashboard_id AS panel_dashboard_id,
                p.do_display AS panel_do_display,
                p.show_sparkline AS panel_show_sparkline,
                m.id AS id,
                m.metric_type_label AS metric_type_label,
                m.metric_properties AS metric_properties,
                m.slug AS slug,
                m.label AS label,
                m.description AS description,
                m.unit_label AS unit_label,
                m.unit_label_plural AS unit_label_plural,
                m.do_collect AS do_collect
            FROM dashboard_panels p
            JOIN metrics m ON m.id = p.metric_id
            WHERE p.dashboard_id = $1
            ORDER BY p.id ASC
            "#,
        )
        .bind(dashboard_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| PanelMetric::try_from(row).map_err(anyhow::Error::from))
            .collect()
    }
}

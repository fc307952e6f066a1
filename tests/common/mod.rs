#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use dbag::collection::{CollectOptions, MetricManager};
use dbag::datamodel::Metric;
use dbag::metric_types::{MetricType, MetricTypeRegistry, register_builtin_types};
use dbag::storage::{StorageInstance, storage_factory::create_storage_from_connection_string};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

pub mod http;

/// Isolated test database.
///
/// Uses a fresh in-memory SQLite database unless `TEST_DATABASE_URL` points
/// to another database. In that case the tables are emptied first, so run
/// those tests with `--test-threads=1`.
pub struct TestDb {
    pub storage: Arc<dyn StorageInstance>,
    pub connection_string: String,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let connection_string =
            std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

        let storage = create_storage_from_connection_string(&connection_string).await?;
        storage.create_or_migrate().await?;

        if !connection_string.contains(":memory:") {
            Self::truncate(&connection_string).await?;
        }

        Ok(Self {
            storage,
            connection_string,
        })
    }

    async fn truncate(connection_string: &str) -> Result<()> {
        #[cfg(feature = "postgres")]
        if connection_string.starts_with("postgres") {
            let pool = sqlx::PgPool::connect(connection_string).await?;
            sqlx::query(
                "TRUNCATE TABLE datum_samples, dashboard_panels, dashboards, metrics RESTART IDENTITY CASCADE",
            )
            .execute(&pool)
            .await?;
            return Ok(());
        }

        #[cfg(feature = "sqlite")]
        if connection_string.starts_with("sqlite") {
            let pool = sqlx::SqlitePool::connect(connection_string).await?;
            for table in ["datum_samples", "dashboard_panels", "dashboards", "metrics"] {
                sqlx::query(&format!("DELETE FROM {}", table))
                    .execute(&pool)
                    .await?;
            }
            return Ok(());
        }

        Err(anyhow!("Cannot empty test database {}", connection_string))
    }

    pub fn storage(&self) -> Arc<dyn StorageInstance> {
        self.storage.clone()
    }

    /// Manager with the built-in metric types and the test ones.
    pub fn manager(&self) -> MetricManager {
        self.manager_with_options(CollectOptions::default())
    }

    pub fn manager_with_options(&self, options: CollectOptions) -> MetricManager {
        MetricManager::new(Arc::new(self.registry()), self.storage()).with_options(options)
    }

    pub fn registry(&self) -> MetricTypeRegistry {
        let mut registry = MetricTypeRegistry::new();
        register_builtin_types(&mut registry, self.storage());
        registry.register("fixed", Fixed(42));
        registry.register("failing", Failing);
        registry.register("slow", Slow(Duration::from_secs(5)));
        registry
    }
}

/// Always samples the same value.
#[derive(Debug)]
pub struct Fixed(pub i64);

#[async_trait]
impl MetricType for Fixed {
    fn description(&self) -> &str {
        "Fixed test value"
    }

    async fn gather_data_sample(&self, _metric: &Metric) -> Result<i64> {
        Ok(self.0)
    }
}

#[derive(Debug)]
pub struct Failing;

#[async_trait]
impl MetricType for Failing {
    fn description(&self) -> &str {
        "Always fails"
    }

    async fn gather_data_sample(&self, metric: &Metric) -> Result<i64> {
        Err(anyhow!("source unavailable for {}", metric.slug))
    }
}

/// Sleeps before answering, to exercise the collection timeout.
#[derive(Debug)]
pub struct Slow(pub Duration);

#[async_trait]
impl MetricType for Slow {
    fn description(&self) -> &str {
        "Answers slowly"
    }

    async fn gather_data_sample(&self, _metric: &Metric) -> Result<i64> {
        tokio::time::sleep(self.0).await;
        Ok(1)
    }
}

/// Returns 1, 2, 3, ... across calls.
#[derive(Debug, Default)]
pub struct Counting(pub Arc<AtomicI64>);

#[async_trait]
impl MetricType for Counting {
    fn description(&self) -> &str {
        "Counts its calls"
    }

    async fn gather_data_sample(&self, _metric: &Metric) -> Result<i64> {
        Ok(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

mod common;

use anyhow::Result;
use common::{Counting, Fixed, TestDb};
use dbag::collection::{CollectOptions, MetricManager};
use dbag::datamodel::NewMetric;
use dbag::metric_types::{MetricError, MetricTypeRegistry};
use dbag::storage::StorageError;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::time::Duration;

mod create_metric_tests {
    use super::*;

    #[tokio::test]
    async fn test_slug_derived_from_label() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let metric = manager
            .create_metric(NewMetric::new("fixed", "Active Users (30 days)"))
            .await?;

        assert_eq!(metric.slug, "active-users-30-days");
        assert_eq!(metric.label, "Active Users (30 days)");
        assert!(metric.do_collect);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_metric_type_creates_nothing() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let err = manager
            .create_metric(NewMetric::new("does_not_exist", "Users"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MetricError>(),
            Some(MetricError::MetricTypeNotFound { label }) if label == "does_not_exist"
        ));
        assert!(test_db.storage.list_metrics().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_derived_slug_is_rejected() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        manager.create_metric(NewMetric::new("fixed", "Users")).await?;
        let err = manager
            .create_metric(NewMetric::new("fixed", "users"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::ConstraintViolation { .. })
        ));
        assert_eq!(test_db.storage.list_metrics().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let too_long = "x".repeat(76);
        assert!(
            manager
                .create_metric(NewMetric::new("fixed", too_long))
                .await
                .is_err()
        );
        assert!(manager.create_metric(NewMetric::new("fixed", "")).await.is_err());
        assert!(
            manager
                .create_metric(NewMetric::new("fixed", "Users").with_slug("not a slug"))
                .await
                .is_err()
        );
        assert!(test_db.storage.list_metrics().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_properties_are_checked_by_the_metric_type() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let err = manager
            .create_metric(NewMetric::new("constant", "Users"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MetricError>(),
            Some(MetricError::InvalidProperties { .. })
        ));

        let metric = manager
            .create_metric(NewMetric::new("constant", "Users").with_property("value", 5))
            .await?;
        assert_eq!(metric.metric_properties.get("value"), Some(&json!(5)));
        Ok(())
    }
}

mod display_tests {
    use super::*;
    use dbag::datamodel::MetricDisplay;

    #[tokio::test]
    async fn test_update_metric_display() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();
        let metric = manager.create_metric(NewMetric::new("fixed", "Users")).await?;

        let mut display = MetricDisplay::from(&metric);
        display.label = String::new();
        assert!(manager.update_metric_display(&metric, &display).await.is_err());

        display.label = "Active users".to_string();
        manager.update_metric_display(&metric, &display).await?;
        let updated = test_db.storage.get_metric(metric.id).await?.unwrap();
        assert_eq!(updated.label, "Active users");
        assert_eq!(updated.slug, "users");
        Ok(())
    }
}

mod collect_tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_twice_and_read_latest() -> Result<()> {
        // Given: a metric type always answering 5
        let test_db = TestDb::new().await?;
        let mut registry = MetricTypeRegistry::new();
        registry.register("constant_5", Fixed(5));
        let manager = MetricManager::new(Arc::new(registry), test_db.storage());

        let metric = manager
            .create_metric(NewMetric::new("constant_5", "Users"))
            .await?;
        assert_eq!(metric.slug, "users");
        assert!(manager.latest_sample(&metric).await?.is_none());

        // When: collecting twice
        let first = manager.collect_all().await?;
        let second = manager.collect_all().await?;

        // Then: two samples of 5, the latest being the second one
        assert!(first.is_success());
        assert!(second.is_success());
        let first_sample = *first.sample_for("users").unwrap();
        let second_sample = *second.sample_for("users").unwrap();
        assert_eq!(first_sample.value, 5);
        assert_eq!(second_sample.value, 5);
        assert_eq!(test_db.storage.count_samples(metric.id).await?, 2);

        let latest = manager.latest_sample(&metric).await?.unwrap();
        assert_eq!(latest.id, second_sample.id);
        assert!(latest.utc_timestamp >= first_sample.utc_timestamp);
        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_metrics_are_skipped() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let collected = manager.create_metric(NewMetric::new("fixed", "On")).await?;
        let skipped = manager
            .create_metric(NewMetric::new("fixed", "Off").with_do_collect(false))
            .await?;

        let report = manager.collect_all().await?;

        assert_eq!(report.attempted(), 1);
        assert_eq!(test_db.storage.count_samples(collected.id).await?, 1);
        assert_eq!(test_db.storage.count_samples(skipped.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_metric_does_not_stop_the_others() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        let broken = manager
            .create_metric(NewMetric::new("failing", "Broken"))
            .await?;
        let healthy = manager.create_metric(NewMetric::new("fixed", "Healthy")).await?;

        let report = manager.collect_all().await?;

        assert!(!report.is_success());
        assert_eq!(report.attempted(), 2);
        let failure = report.failure_for("broken").unwrap();
        assert!(failure.error.contains("source unavailable"));
        assert_eq!(report.sample_for("healthy").unwrap().value, 42);
        assert_eq!(test_db.storage.count_samples(broken.id).await?, 0);
        assert_eq!(test_db.storage.count_samples(healthy.id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unregistered_metric_type_is_reported() -> Result<()> {
        // Given: a metric created while its type was registered
        let test_db = TestDb::new().await?;
        let full = test_db.manager();
        full.create_metric(NewMetric::new("fixed", "Orphan")).await?;
        full.create_metric(NewMetric::new("constant", "Kept").with_property("value", 3))
            .await?;

        // When: collecting with a registry that lost that type
        let mut registry = test_db.registry();
        registry.unregister("fixed")?;
        let manager = MetricManager::new(Arc::new(registry), test_db.storage());
        let report = manager.collect_all().await?;

        // Then: the orphan fails, the other is collected
        let failure = report.failure_for("orphan").unwrap();
        assert!(failure.error.contains("MetricType doesn't exist with label fixed"));
        assert_eq!(report.sample_for("kept").unwrap().value, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_metric_times_out() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager_with_options(CollectOptions {
            timeout: Duration::from_millis(100),
            concurrency: 1,
        });

        let slow = manager.create_metric(NewMetric::new("slow", "Slow")).await?;
        manager.create_metric(NewMetric::new("fixed", "Fast")).await?;

        let report = manager.collect_all().await?;

        assert!(report.failure_for("slow").unwrap().error.contains("timed out"));
        assert!(report.sample_for("fast").is_some());
        assert_eq!(test_db.storage.count_samples(slow.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_collection() -> Result<()> {
        let test_db = TestDb::new().await?;
        let counter = Arc::new(AtomicI64::new(0));
        let mut registry = MetricTypeRegistry::new();
        registry.register("counting", Counting(counter.clone()));
        let manager = MetricManager::new(Arc::new(registry), test_db.storage()).with_options(
            CollectOptions {
                timeout: Duration::from_secs(5),
                concurrency: 4,
            },
        );

        for i in 0..10 {
            manager
                .create_metric(NewMetric::new("counting", format!("Metric {}", i)))
                .await?;
        }

        let report = manager.collect_all().await?;

        assert!(report.is_success());
        assert_eq!(report.collected.len(), 10);
        let mut values: Vec<i64> = report.collected.iter().map(|c| c.sample.value).collect();
        values.sort();
        assert_eq!(values, (1..=10).collect::<Vec<_>>());
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_metric_with_sql_scalar() -> Result<()> {
        let test_db = TestDb::new().await?;
        let manager = test_db.manager();

        manager.create_metric(NewMetric::new("fixed", "Users")).await?;
        let count = manager
            .create_metric(
                NewMetric::new("sql_scalar", "Metric count")
                    .with_property("query", "SELECT COUNT(*) FROM metrics"),
            )
            .await?;

        let sample = manager.collect_metric(&count).await?;
        assert_eq!(sample.value, 2);
        assert_eq!(sample.metric_id, count.id);
        Ok(())
    }
}

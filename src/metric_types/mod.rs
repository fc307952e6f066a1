//! Metric types: pluggable strategies that gather one sample for a metric.

use crate::datamodel::{Metric, MetricProperties};
use crate::storage::StorageInstance;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

pub mod constant;
pub mod error;
pub mod registry;
pub mod sql_scalar;

pub use constant::ConstantMetricType;
pub use error::MetricError;
pub use registry::MetricTypeRegistry;
pub use sql_scalar::SqlScalarMetricType;

/// Knows how to produce one integer sample given a metric's configuration.
///
/// Implementations are registered in a [`MetricTypeRegistry`] under a label,
/// and metrics refer to them through `metric_type_label`.
#[async_trait]
pub trait MetricType: Send + Sync + Debug {
    /// Human-readable summary, shown when picking a metric type.
    fn description(&self) -> &str;

    /// Checks the properties a metric is created with.
    /// Accepts anything unless the metric type needs specific keys.
    fn validate_properties(&self, _properties: &MetricProperties) -> Result<()> {
        Ok(())
    }

    async fn gather_data_sample(&self, metric: &Metric) -> Result<i64>;
}

/// Registers the metric types shipped with dbag.
pub fn register_builtin_types(
    registry: &mut MetricTypeRegistry,
    storage: Arc<dyn StorageInstance>,
) {
    registry.register(constant::LABEL, ConstantMetricType);
    registry.register(sql_scalar::LABEL, SqlScalarMetricType::new(storage));
}

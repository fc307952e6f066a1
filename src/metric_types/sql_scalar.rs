use super::MetricType;
use crate::datamodel::{Metric, MetricProperties};
use crate::storage::StorageInstance;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;

pub const LABEL: &str = "sql_scalar";

/// Samples the single integer returned by the SQL query stored under the
/// `query` property, eg. `SELECT COUNT(*) FROM users`.
///
/// The query runs against the dbag database itself.
#[derive(Debug, Clone)]
pub struct SqlScalarMetricType {
    storage: Arc<dyn StorageInstance>,
}

impl SqlScalarMetricType {
    pub fn new(storage: Arc<dyn StorageInstance>) -> Self {
        Self { storage }
    }
}

fn sql_query(properties: &MetricProperties) -> Result<&str> {
    let query = properties
        .get("query")
        .ok_or_else(|| anyhow!("missing 'query' property"))?
        .as_str()
        .ok_or_else(|| anyhow!("'query' must be a string"))?;
    if query.trim().is_empty() {
        return Err(anyhow!("'query' must not be empty"));
    }
    Ok(query)
}

#[async_trait]
impl MetricType for SqlScalarMetricType {
    fn description(&self) -> &str {
        "Integer returned by the SQL query in the 'query' property"
    }

    fn validate_properties(&self, properties: &MetricProperties) -> Result<()> {
        sql_query(properties).map(|_| ())
    }

    async fn gather_data_sample(&self, metric: &Metric) -> Result<i64> {
        let query = sql_query(&metric.metric_properties)?;
        self.storage
            .query_scalar(query)
            .await
            .with_context(|| format!("Failed to gather sample for metric {}", metric.slug))
    }
}

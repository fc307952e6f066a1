use super::MetricType;
use crate::datamodel::{Metric, MetricProperties};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

pub const LABEL: &str = "constant";

/// Always samples the integer stored under the `value` property.
/// Handy for placeholders and for checking a collection pipeline end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantMetricType;

fn constant_value(properties: &MetricProperties) -> Result<i64> {
    properties
        .get("value")
        .ok_or_else(|| anyhow!("missing 'value' property"))?
        .as_i64()
        .ok_or_else(|| anyhow!("'value' must be an integer"))
}

#[async_trait]
impl MetricType for ConstantMetricType {
    fn description(&self) -> &str {
        "Constant integer read from the 'value' property"
    }

    fn validate_properties(&self, properties: &MetricProperties) -> Result<()> {
        constant_value(properties).map(|_| ())
    }

    async fn gather_data_sample(&self, metric: &Metric) -> Result<i64> {
        constant_value(&metric.metric_properties)
    }
}

use crate::datamodel::dbag_datetime::to_rfc3339;
use crate::datamodel::{DatumSample, Metric};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricViewModel {
    pub slug: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metric_type: String,
    #[schema(value_type = Object)]
    pub metric_properties: Value,
    pub unit_label: String,
    pub unit_label_plural: String,
    pub do_collect: bool,
}

impl From<Metric> for MetricViewModel {
    fn from(metric: Metric) -> Self {
        Self {
            slug: metric.slug,
            label: metric.label,
            description: metric.description,
            metric_type: metric.metric_type_label,
            metric_properties: Value::Object(metric.metric_properties),
            unit_label: metric.unit_label,
            unit_label_plural: metric.unit_label_plural,
            do_collect: metric.do_collect,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SampleViewModel {
    /// RFC 3339, UTC
    pub utc_timestamp: String,
    pub value: i64,
}

// The timestamp formatting can fail for dates out of the RFC 3339 range
impl TryFrom<DatumSample> for SampleViewModel {
    type Error = anyhow::Error;

    fn try_from(sample: DatumSample) -> Result<Self, Self::Error> {
        Ok(Self {
            utc_timestamp: to_rfc3339(&sample.utc_timestamp)?,
            value: sample.value,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricTypeViewModel {
    pub label: String,
    pub description: String,
}

use super::slug::slugify;
use super::validation::{
    MAX_LABEL_LENGTH, MAX_METRIC_TYPE_LABEL_LENGTH, ValidationError, check_description,
    check_label, check_max_length, check_not_empty, check_slug,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Strategy-specific configuration of a metric, stored as a JSON object.
pub type MetricProperties = Map<String, Value>;

/// A metric type and its configuration, sampled once per collection run
/// to form a trend. Usually displayed as one panel on a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: i64,

    /// Label under which the metric type was registered.
    pub metric_type_label: String,

    /// Everything the metric type needs to gather a sample,
    /// for example the SQL query to run.
    pub metric_properties: MetricProperties,

    /// Unique, stable identifier.
    pub slug: String,

    /// Short header used when the metric is displayed in a panel.
    pub label: String,

    /// How the metric is gathered or how to interpret it.
    pub description: Option<String>,

    /// Singular unit, eg. `user account`.
    pub unit_label: String,

    /// Plural unit, eg. `user accounts`.
    pub unit_label_plural: String,

    /// Pauses collection while keeping the samples already collected.
    pub do_collect: bool,
}

impl Metric {
    /// Unit label matching the given value, `1 user account` / `2 user accounts`.
    pub fn unit_for(&self, value: i64) -> &str {
        if value == 1 || value == -1 {
            &self.unit_label
        } else {
            &self.unit_label_plural
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metric {{ slug: {}, label: {}, type: {}",
            self.slug, self.label, self.metric_type_label
        )?;
        if !self.do_collect {
            write!(f, ", paused")?;
        }
        write!(f, " }}")
    }
}

/// A metric that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub metric_type_label: String,
    pub label: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub metric_properties: MetricProperties,
    pub unit_label: String,
    pub unit_label_plural: String,
    pub do_collect: bool,
}

impl NewMetric {
    pub fn new(metric_type_label: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            metric_type_label: metric_type_label.into(),
            label: label.into(),
            slug: None,
            description: None,
            metric_properties: MetricProperties::new(),
            unit_label: String::new(),
            unit_label_plural: String::new(),
            do_collect: true,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metric_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: MetricProperties) -> Self {
        self.metric_properties = properties;
        self
    }

    pub fn with_units(
        mut self,
        unit_label: impl Into<String>,
        unit_label_plural: impl Into<String>,
    ) -> Self {
        self.unit_label = unit_label.into();
        self.unit_label_plural = unit_label_plural.into();
        self
    }

    pub fn with_do_collect(mut self, do_collect: bool) -> Self {
        self.do_collect = do_collect;
        self
    }

    /// The explicit slug, or one derived from the label when none was given.
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.label),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("metric_type_label", &self.metric_type_label)?;
        check_max_length(
            "metric_type_label",
            &self.metric_type_label,
            MAX_METRIC_TYPE_LABEL_LENGTH,
        )?;
        check_label(&self.label)?;
        check_slug(&self.resolved_slug())?;
        check_description(self.description.as_deref())?;
        check_max_length("unit_label", &self.unit_label, MAX_LABEL_LENGTH)?;
        check_max_length("unit_label_plural", &self.unit_label_plural, MAX_LABEL_LENGTH)
    }
}

/// Display fields of a metric that can be edited after creation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricDisplay {
    pub label: String,
    pub description: Option<String>,
    pub unit_label: String,
    pub unit_label_plural: String,
}

impl MetricDisplay {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_label(&self.label)?;
        check_description(self.description.as_deref())?;
        check_max_length("unit_label", &self.unit_label, MAX_LABEL_LENGTH)?;
        check_max_length("unit_label_plural", &self.unit_label_plural, MAX_LABEL_LENGTH)
    }
}

impl From<&Metric> for MetricDisplay {
    fn from(metric: &Metric) -> Self {
        Self {
            label: metric.label.clone(),
            description: metric.description.clone(),
            unit_label: metric.unit_label.clone(),
            unit_label_plural: metric.unit_label_plural.clone(),
        }
    }
}

use crate::datamodel::ValidationError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("MetricType doesn't exist with label {label}")]
    MetricTypeNotFound { label: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid properties for metric type {label}: {reason}")]
    InvalidProperties { label: String, reason: String },

    #[error("Collection of metric {slug} timed out after {timeout:?}")]
    CollectionTimeout { slug: String, timeout: Duration },
}

impl MetricError {
    pub fn metric_type_not_found(label: &str) -> Self {
        MetricError::MetricTypeNotFound {
            label: label.to_string(),
        }
    }
}

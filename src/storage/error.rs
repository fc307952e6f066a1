use thiserror::Error;

/// Storage-specific errors that can occur during database operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write
    #[error("Constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    /// Invalid data format in database
    #[error("Invalid data format: {message} for {context}")]
    InvalidDataFormat { message: String, context: String },

    /// Metric not found, by slug or id
    #[error("Metric not found: {key}")]
    MetricNotFound { key: String },

    #[error("Dashboard not found: {key}")]
    DashboardNotFound { key: String },

    #[error("Panel not found: metric {metric_id} on dashboard {dashboard_id}")]
    PanelNotFound { metric_id: i64, dashboard_id: i64 },
}

impl StorageError {
    /// Maps unique violations to [`StorageError::ConstraintViolation`],
    /// anything else stays a database error.
    pub fn from_write_error(error: sqlx::Error, constraint: impl FnOnce() -> String) -> Self {
        match &error {
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                StorageError::ConstraintViolation {
                    constraint: constraint(),
                }
            }
            _ => StorageError::Database(error),
        }
    }

    pub fn invalid_data_format(message: &str, context: &str) -> Self {
        StorageError::InvalidDataFormat {
            message: message.to_string(),
            context: context.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::MetricNotFound { .. }
                | StorageError::DashboardNotFound { .. }
                | StorageError::PanelNotFound { .. }
        )
    }
}

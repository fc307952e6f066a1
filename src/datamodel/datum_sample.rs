use super::DbagDateTime;

/// One immutable sample of a metric, usually a daily summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumSample {
    pub id: i64,
    pub metric_id: i64,
    /// When the sample was collected.
    pub utc_timestamp: DbagDateTime,
    pub value: i64,
}

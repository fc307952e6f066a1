use crate::datamodel::DatumSample;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedSample {
    pub metric_slug: String,
    pub sample: DatumSample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub metric_slug: String,
    pub error: String,
}

/// Outcome of one collection run over every collectible metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionReport {
    pub collected: Vec<CollectedSample>,
    pub failures: Vec<CollectionFailure>,
}

impl CollectionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.collected.len() + self.failures.len()
    }

    pub fn sample_for(&self, metric_slug: &str) -> Option<&DatumSample> {
        self.collected
            .iter()
            .find(|collected| collected.metric_slug == metric_slug)
            .map(|collected| &collected.sample)
    }

    pub fn failure_for(&self, metric_slug: &str) -> Option<&CollectionFailure> {
        self.failures
            .iter()
            .find(|failure| failure.metric_slug == metric_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{DbagDateTime, DbagDateTimeExt};

    #[test]
    fn test_report_lookups() {
        let report = CollectionReport {
            collected: vec![CollectedSample {
                metric_slug: "users".to_string(),
                sample: DatumSample {
                    id: 1,
                    metric_id: 1,
                    utc_timestamp: DbagDateTime::from_unix_microseconds_i64(0),
                    value: 5,
                },
            }],
            failures: vec![CollectionFailure {
                metric_slug: "broken".to_string(),
                error: "boom".to_string(),
            }],
        };

        assert!(!report.is_success());
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.sample_for("users").unwrap().value, 5);
        assert!(report.sample_for("broken").is_none());
        assert_eq!(report.failure_for("broken").unwrap().error, "boom");
    }

    #[test]
    fn test_empty_report_is_success() {
        let report = CollectionReport::default();
        assert!(report.is_success());
        assert_eq!(report.attempted(), 0);
    }
}

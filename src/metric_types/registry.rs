use super::{MetricError, MetricType};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Maps metric type labels to their implementation.
///
/// Built at startup with `&mut` access, then shared behind an `Arc`.
/// Registering an existing label replaces the previous metric type.
#[derive(Debug, Default, Clone)]
pub struct MetricTypeRegistry {
    metric_types: BTreeMap<String, Arc<dyn MetricType>>,
}

impl MetricTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: MetricType + 'static>(&mut self, label: impl Into<String>, metric_type: T) {
        self.register_arc(label, Arc::new(metric_type));
    }

    pub fn register_arc(&mut self, label: impl Into<String>, metric_type: Arc<dyn MetricType>) {
        let label = label.into();
        debug!("Registering metric type {}", label);
        self.metric_types.insert(label, metric_type);
    }

    pub fn unregister(&mut self, label: &str) -> Result<Arc<dyn MetricType>, MetricError> {
        self.metric_types
            .remove(label)
            .ok_or_else(|| MetricError::metric_type_not_found(label))
    }

    pub fn resolve(&self, label: &str) -> Option<Arc<dyn MetricType>> {
        self.metric_types.get(label).cloned()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.metric_types.contains_key(label)
    }

    /// Snapshot of every registered metric type, by label.
    pub fn list_registered(&self) -> BTreeMap<String, Arc<dyn MetricType>> {
        self.metric_types.clone()
    }

    /// Registered labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        self.metric_types.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.metric_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metric_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::Metric;
    use anyhow::Result;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Fixed(i64);

    #[async_trait]
    impl MetricType for Fixed {
        fn description(&self) -> &str {
            "fixed value"
        }

        async fn gather_data_sample(&self, _metric: &Metric) -> Result<i64> {
            Ok(self.0)
        }
    }

    fn metric() -> Metric {
        Metric {
            id: 1,
            metric_type_label: "fixed".to_string(),
            metric_properties: Default::default(),
            slug: "fixed".to_string(),
            label: "Fixed".to_string(),
            description: None,
            unit_label: String::new(),
            unit_label_plural: String::new(),
            do_collect: true,
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let mut registry = MetricTypeRegistry::new();
        registry.register("one", Fixed(1));
        registry.register("two", Fixed(2));

        let one = registry.resolve("one").unwrap();
        assert_eq!(one.gather_data_sample(&metric()).await.unwrap(), 1);
        let two = registry.resolve("two").unwrap();
        assert_eq!(two.gather_data_sample(&metric()).await.unwrap(), 2);
        assert!(registry.resolve("three").is_none());
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut registry = MetricTypeRegistry::new();
        registry.register("fixed", Fixed(1));
        registry.register("fixed", Fixed(7));

        assert_eq!(registry.len(), 1);
        let fixed = registry.resolve("fixed").unwrap();
        assert_eq!(fixed.gather_data_sample(&metric()).await.unwrap(), 7);
    }

    #[test]
    fn test_unregister() {
        let mut registry = MetricTypeRegistry::new();
        registry.register("fixed", Fixed(1));

        assert!(registry.unregister("fixed").is_ok());
        assert!(registry.resolve("fixed").is_none());
        assert!(registry.is_empty());

        let err = registry.unregister("fixed").unwrap_err();
        assert!(matches!(err, MetricError::MetricTypeNotFound { ref label } if label == "fixed"));
    }

    #[test]
    fn test_list_registered_is_a_snapshot() {
        let mut registry = MetricTypeRegistry::new();
        registry.register("b", Fixed(2));
        registry.register("a", Fixed(1));

        let snapshot = registry.list_registered();
        registry.register("c", Fixed(3));

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(registry.labels(), vec!["a", "b", "c"]);
        assert!(registry.contains("c"));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = MetricTypeRegistry::new();
        let second = MetricTypeRegistry::new();
        first.register("fixed", Fixed(1));

        assert!(first.contains("fixed"));
        assert!(!second.contains("fixed"));
    }
}

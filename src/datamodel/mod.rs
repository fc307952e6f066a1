pub mod dashboard;
pub mod datum_sample;
pub mod dbag_datetime;
pub mod metric;
pub mod slug;
pub mod validation;

pub use dashboard::{Dashboard, DashboardPanel, NewDashboard, PanelMetric, PanelOptions};
pub use datum_sample::DatumSample;
pub use dbag_datetime::{DbagDateTime, DbagDateTimeExt};
pub use metric::{Metric, MetricDisplay, MetricProperties, NewMetric};
pub use slug::slugify;
pub use validation::ValidationError;

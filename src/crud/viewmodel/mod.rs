pub mod collection_viewmodel;
pub mod dashboard_viewmodel;
pub mod metric_viewmodel;

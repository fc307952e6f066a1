use super::metric_viewmodel::{MetricViewModel, SampleViewModel};
use crate::datamodel::Dashboard;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardViewModel {
    pub slug: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Dashboard> for DashboardViewModel {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            slug: dashboard.slug,
            label: dashboard.label,
            description: dashboard.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PanelViewModel {
    pub metric: MetricViewModel,
    pub do_display: bool,
    pub show_sparkline: bool,
    pub latest_sample: Option<SampleViewModel>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardDetailViewModel {
    #[serde(flatten)]
    pub dashboard: DashboardViewModel,
    pub panels: Vec<PanelViewModel>,
}

use super::Metric;
use super::slug::slugify;
use super::validation::{ValidationError, check_description, check_label, check_slug};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub id: i64,
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDashboard {
    pub label: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl NewDashboard {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slug: None,
            description: None,
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

    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.label),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_label(&self.label)?;
        check_slug(&self.resolved_slug())?;
        check_description(self.description.as_deref())
    }
}

/// The placement of one metric on one dashboard.
///
/// A metric appears at most once per dashboard, so the same data can be
/// shown differently on different dashboards but never twice on the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardPanel {
    pub id: i64,
    pub metric_id: i64,
    pub dashboard_id: i64,
    /// Toggle to hide the panel without detaching the metric.
    pub do_display: bool,
    pub show_sparkline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PanelOptions {
    pub do_display: bool,
    pub show_sparkline: bool,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            do_display: true,
            show_sparkline: true,
        }
    }
}

impl From<&DashboardPanel> for PanelOptions {
    fn from(panel: &DashboardPanel) -> Self {
        Self {
            do_display: panel.do_display,
            show_sparkline: panel.show_sparkline,
        }
    }
}

/// A panel together with the metric it displays.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelMetric {
    pub panel: DashboardPanel,
    pub metric: Metric,
}

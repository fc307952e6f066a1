use crate::crud::viewmodel::dashboard_viewmodel::{
    DashboardDetailViewModel, DashboardViewModel, PanelViewModel,
};
use crate::crud::viewmodel::metric_viewmodel::{
    MetricTypeViewModel, MetricViewModel, SampleViewModel,
};
use crate::datamodel::{Dashboard, Metric};
use crate::http::app_error::AppError;
use crate::http::state::HttpServerState;
use crate::storage::StorageError;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

/// Hard cap on the number of samples returned at once.
pub const MAX_SAMPLES_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct SamplesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub include_hidden: Option<bool>,
}

async fn find_metric(state: &HttpServerState, slug: &str) -> Result<Metric, AppError> {
    state
        .manager
        .storage()
        .get_metric_by_slug(slug)
        .await?
        .ok_or_else(|| {
            AppError::not_found(StorageError::MetricNotFound {
                key: slug.to_string(),
            })
        })
}

async fn find_dashboard(state: &HttpServerState, slug: &str) -> Result<Dashboard, AppError> {
    state
        .manager
        .storage()
        .get_dashboard_by_slug(slug)
        .await?
        .ok_or_else(|| {
            AppError::not_found(StorageError::DashboardNotFound {
                key: slug.to_string(),
            })
        })
}

/// List the registered metric types.
#[utoipa::path(
    get,
    path = "/api/v1/metric-types",
    tag = "dbag",
    responses(
        (status = 200, description = "Registered metric types", body = Vec<MetricTypeViewModel>)
    )
)]
pub async fn list_metric_types(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<MetricTypeViewModel>>, AppError> {
    let metric_types = state
        .manager
        .registry()
        .list_registered()
        .into_iter()
        .map(|(label, metric_type)| MetricTypeViewModel {
            label,
            description: metric_type.description().to_string(),
        })
        .collect();
    Ok(Json(metric_types))
}

/// List all metrics.
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    tag = "dbag",
    responses(
        (status = 200, description = "All metrics", body = Vec<MetricViewModel>),
        (status = 500, description = "Internal Server Error", body = AppError),
    )
)]
pub async fn list_metrics(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<MetricViewModel>>, AppError> {
    let metrics = state.manager.storage().list_metrics().await?;
    Ok(Json(metrics.into_iter().map(MetricViewModel::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/metrics/{slug}",
    tag = "dbag",
    params(("slug" = String, Path, description = "Metric slug")),
    responses(
        (status = 200, description = "The metric", body = MetricViewModel),
        (status = 404, description = "Metric not found", body = AppError),
    )
)]
pub async fn get_metric(
    State(state): State<HttpServerState>,
    Path(slug): Path<String>,
) -> Result<Json<MetricViewModel>, AppError> {
    let metric = find_metric(&state, &slug).await?;
    Ok(Json(metric.into()))
}

/// Samples of a metric, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/{slug}/samples",
    tag = "dbag",
    params(
        ("slug" = String, Path, description = "Metric slug"),
        ("limit" = Option<usize>, Query, description = "Maximum number of samples")
    ),
    responses(
        (status = 200, description = "Samples, most recent first", body = Vec<SampleViewModel>),
        (status = 404, description = "Metric not found", body = AppError),
    )
)]
pub async fn list_metric_samples(
    State(state): State<HttpServerState>,
    Path(slug): Path<String>,
    Query(query): Query<SamplesQuery>,
) -> Result<Json<Vec<SampleViewModel>>, AppError> {
    let metric = find_metric(&state, &slug).await?;
    let limit = query.limit.map(|limit| limit.min(MAX_SAMPLES_LIMIT));
    let samples = state
        .manager
        .storage()
        .list_samples(metric.id, limit)
        .await?
        .into_iter()
        .map(SampleViewModel::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(samples))
}

#[utoipa::path(
    get,
    path = "/api/v1/metrics/{slug}/latest",
    tag = "dbag",
    params(("slug" = String, Path, description = "Metric slug")),
    responses(
        (status = 200, description = "Most recent sample", body = SampleViewModel),
        (status = 404, description = "Metric not found or not collected yet", body = AppError),
    )
)]
pub async fn get_latest_sample(
    State(state): State<HttpServerState>,
    Path(slug): Path<String>,
) -> Result<Json<SampleViewModel>, AppError> {
    let metric = find_metric(&state, &slug).await?;
    let sample = state
        .manager
        .latest_sample(&metric)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No samples yet for metric {}", slug)))?;
    Ok(Json(SampleViewModel::try_from(sample)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboards",
    tag = "dbag",
    responses(
        (status = 200, description = "All dashboards", body = Vec<DashboardViewModel>)
    )
)]
pub async fn list_dashboards(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<DashboardViewModel>>, AppError> {
    let dashboards = state.manager.storage().list_dashboards().await?;
    Ok(Json(
        dashboards.into_iter().map(DashboardViewModel::from).collect(),
    ))
}

/// A dashboard with its panels and the latest sample of each metric.
///
/// Hidden panels are left out unless `include_hidden` is set.
#[utoipa::path(
    get,
    path = "/api/v1/dashboards/{slug}",
    tag = "dbag",
    params(
        ("slug" = String, Path, description = "Dashboard slug"),
        ("include_hidden" = Option<bool>, Query, description = "Include hidden panels")
    ),
    responses(
        (status = 200, description = "The dashboard", body = DashboardDetailViewModel),
        (status = 404, description = "Dashboard not found", body = AppError),
    )
)]
pub async fn get_dashboard(
    State(state): State<HttpServerState>,
    Path(slug): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardDetailViewModel>, AppError> {
    let dashboard = find_dashboard(&state, &slug).await?;
    let include_hidden = query.include_hidden.unwrap_or(false);

    let panel_metrics = state.manager.storage().list_panels(dashboard.id).await?;
    let mut panels = Vec::with_capacity(panel_metrics.len());
    for panel_metric in panel_metrics {
        if !panel_metric.panel.do_display && !include_hidden {
            continue;
        }
        let latest_sample = state
            .manager
            .latest_sample(&panel_metric.metric)
            .await?
            .map(SampleViewModel::try_from)
            .transpose()?;
        panels.push(PanelViewModel {
            metric: panel_metric.metric.into(),
            do_display: panel_metric.panel.do_display,
            show_sparkline: panel_metric.panel.show_sparkline,
            latest_sample,
        });
    }

    Ok(Json(DashboardDetailViewModel {
        dashboard: dashboard.into(),
        panels,
    }))
}

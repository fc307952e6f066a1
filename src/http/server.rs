use super::app_error::AppError;
use super::collect::trigger_collection;
use super::crud::{
    get_dashboard, get_latest_sample, get_metric, list_dashboards, list_metric_samples,
    list_metric_types, list_metrics,
};
use super::health::{liveness, readiness};
use super::state::HttpServerState;
use crate::config;
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace;
use tower_http::{ServiceBuilderExt, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "dbag", description = "Metrics and dashboards API"),
        (name = "Health", description = "Liveness and readiness probes"),
    ),
    paths(
        frontpage,
        super::health::liveness,
        super::health::readiness,
        super::crud::list_metric_types,
        super::crud::list_metrics,
        super::crud::get_metric,
        super::crud::list_metric_samples,
        super::crud::get_latest_sample,
        super::crud::list_dashboards,
        super::crud::get_dashboard,
        super::collect::trigger_collection,
    ),
)]
struct ApiDoc;

/// All the routes, without the middleware.
pub fn build_router(state: HttpServerState) -> Router {
    Router::new()
        .route("/", get(frontpage))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        // Probes
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        // Read API
        .route("/api/v1/metric-types", get(list_metric_types))
        .route("/api/v1/metrics", get(list_metrics))
        .route("/api/v1/metrics/{slug}", get(get_metric))
        .route("/api/v1/metrics/{slug}/samples", get(list_metric_samples))
        .route("/api/v1/metrics/{slug}/latest", get(get_latest_sample))
        .route("/api/v1/dashboards", get(list_dashboards))
        .route("/api/v1/dashboards/{slug}", get(get_dashboard))
        // On-demand collection
        .route("/api/v1/collect", post(trigger_collection))
        .with_state(state)
}

pub async fn run_http_server(state: HttpServerState, address: SocketAddr) -> Result<()> {
    let config = config::get()?;
    let timeout_seconds = config.http_server_timeout_seconds;

    // List of headers that shouldn't be logged
    let sensitive_headers: Arc<[_]> = vec![header::AUTHORIZATION, header::COOKIE].into();

    let middleware = ServiceBuilder::new()
        .sensitive_request_headers(sensitive_headers.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .sensitive_response_headers(sensitive_headers)
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_seconds)))
        .compression()
        .into_inner();

    let app = build_router(state).layer(middleware);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Listening on http://{}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[utoipa::path(
    get,
    path = "/",
    tag = "dbag",
    responses(
        (status = 200, description = "Frontpage", body = String)
    )
)]
async fn frontpage(State(state): State<HttpServerState>) -> Result<Json<String>, AppError> {
    let name: String = (*state.name).clone();
    Ok(Json(name))
}

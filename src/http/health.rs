use super::state::HttpServerState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    /// Number of registered metric types
    pub metric_types: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness check
///
/// Always 200 OK as long as the server can answer.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Readiness check
///
/// Ready once the database answers queries. Without any registered metric
/// type nothing could be collected, so that is reported as not ready too.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<HttpServerState>) -> impl IntoResponse {
    let metric_types = state.manager.registry().len();
    let database = state.manager.storage().health_check().await;

    let (status, response) = match database {
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ReadinessResponse {
                status: "not_ready".to_string(),
                database: "error".to_string(),
                metric_types,
                error: Some(format!("{:#}", e)),
            },
        ),
        Ok(()) if metric_types == 0 => (
            StatusCode::SERVICE_UNAVAILABLE,
            ReadinessResponse {
                status: "not_ready".to_string(),
                database: "ok".to_string(),
                metric_types,
                error: Some("No metric type registered".to_string()),
            },
        ),
        Ok(()) => (
            StatusCode::OK,
            ReadinessResponse {
                status: "ready".to_string(),
                database: "ok".to_string(),
                metric_types,
                error: None,
            },
        ),
    };
    (status, Json(response))
}

use crate::crud::viewmodel::collection_viewmodel::CollectionReportViewModel;
use crate::http::app_error::AppError;
use crate::http::state::HttpServerState;
use axum::Json;
use axum::extract::State;

/// Collect every metric now.
///
/// Same as a scheduled run: metrics that fail are listed in `failures`,
/// the others get a new sample.
///
/// The run happens on its own task, so it still completes when the request
/// itself times out or the client goes away.
#[utoipa::path(
    post,
    path = "/api/v1/collect",
    tag = "dbag",
    responses(
        (status = 200, description = "Collection report", body = CollectionReportViewModel),
        (status = 500, description = "Internal Server Error", body = AppError),
    )
)]
pub async fn trigger_collection(
    State(state): State<HttpServerState>,
) -> Result<Json<CollectionReportViewModel>, AppError> {
    let manager = state.manager.clone();
    let report = tokio::spawn(async move { manager.collect_all().await }).await??;
    Ok(Json(CollectionReportViewModel::try_from(report)?))
}

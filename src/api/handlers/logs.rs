use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use crate::api::{
    state::AppState,
    types::{DeleteLogRequest, LogsResponse, StatusResponse},
};

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<StatusResponse>)>;

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusResponse::error(e.to_string())),
    )
}

/// GET /api/logs -- most recent first
pub async fn get_logs(State(state): State<AppState>) -> ApiResult<LogsResponse> {
    let logs = state.service.logs().await.map_err(|e| {
        error!("Failed to read forensic log: {}", e);
        internal_error(e)
    })?;
    Ok(Json(LogsResponse { logs }))
}

/// DELETE /api/logs/delete
pub async fn delete_log(
    State(state): State<AppState>,
    Json(req): Json<DeleteLogRequest>,
) -> ApiResult<StatusResponse> {
    let removed = state
        .service
        .delete_log(&req.time, &req.file)
        .await
        .map_err(|e| {
            error!("Failed to delete forensic record: {}", e);
            internal_error(e)
        })?;
    info!(time = %req.time, file = %req.file, removed, "Forensic record deleted");
    Ok(Json(StatusResponse::ok("success")))
}

/// DELETE /api/logs/purge
pub async fn purge_logs(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    state.service.purge_logs().await.map_err(|e| {
        error!("Failed to purge forensic log: {}", e);
        internal_error(e)
    })?;
    Ok(Json(StatusResponse::ok("success")))
}

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::api::{
    state::AppState,
    types::{AlertRequest, StatusResponse},
};
use crate::coordinator::BreachReport;

/// POST /api/alert
///
/// A breach that could not be written to the forensic log is answered with
/// 500 so the agent side sees the evidence was lost.
pub async fn receive_alert(
    State(state): State<AppState>,
    Json(req): Json<AlertRequest>,
) -> std::result::Result<Json<StatusResponse>, (StatusCode, Json<StatusResponse>)> {
    let report = BreachReport {
        hostname: req.hostname.unwrap_or_else(|| "UNKNOWN".to_string()),
        file_path: req.file_path.unwrap_or_else(|| "N/A".to_string()),
        image: req.image,
    };

    match state.service.ingest(report).await {
        Ok(_) => Ok(Json(StatusResponse::ok("recorded"))),
        Err(e) => {
            error!("Failed to record breach: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse::error(e.to_string())),
            ))
        }
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{
    state::AppState,
    types::{PolicyUpdateRequest, StatusResponse},
};
use crate::domain::Policy;

/// GET /api/config -- global default policy
pub async fn get_global_policy(State(state): State<AppState>) -> Json<Policy> {
    Json(state.service.global_policy().await)
}

/// GET /api/config/:hostname -- effective policy for one host
pub async fn get_host_policy(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Json<Policy> {
    Json(state.service.resolve_policy(&hostname).await)
}

/// POST /api/policies/update -- whole-object replace of the target policy
pub async fn update_policy(
    State(state): State<AppState>,
    Json(req): Json<PolicyUpdateRequest>,
) -> std::result::Result<Json<StatusResponse>, (StatusCode, Json<StatusResponse>)> {
    let scope = req
        .scope()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(StatusResponse::error(e.to_string()))))?;
    state.service.update_policy(scope, req.to_policy()).await;
    Ok(Json(StatusResponse::ok("success")))
}

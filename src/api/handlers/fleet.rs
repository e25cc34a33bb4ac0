use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;

use crate::api::{
    state::AppState,
    types::{HeartbeatRequest, HeartbeatResponse, StatusResponse},
};
use crate::domain::{Command, HostView};

/// POST /api/heartbeat -- liveness report; the response carries any pending command
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Json<HeartbeatResponse> {
    let command = state
        .service
        .heartbeat(&req.hostname, &req.ip, &req.current_path)
        .await;
    Json(HeartbeatResponse {
        status: "ok".to_string(),
        command,
    })
}

/// GET /api/fleet
pub async fn get_fleet(State(state): State<AppState>) -> Json<BTreeMap<String, HostView>> {
    Json(state.service.fleet().await)
}

/// POST /api/fleet/wipe/:hostname
pub async fn queue_wipe(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Json<StatusResponse> {
    state.service.queue_command(&hostname, Command::WipeCanaries);
    Json(StatusResponse::ok("wipe_queued"))
}

/// POST /api/fleet/lock/:hostname
pub async fn queue_lock(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Json<StatusResponse> {
    state
        .service
        .queue_command(&hostname, Command::LockWorkstation);
    Json(StatusResponse::ok("lock_queued"))
}

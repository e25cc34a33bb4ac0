use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let screenshots = ServeDir::new(state.screenshots_dir.as_ref());

    Router::new()
        .route("/health", get(handlers::health_handler))
        // Breach ingestion
        .route("/api/alert", post(handlers::receive_alert))
        // Forensic log endpoints
        .route("/api/logs", get(handlers::get_logs))
        .route("/api/logs/delete", delete(handlers::delete_log))
        .route("/api/logs/purge", delete(handlers::purge_logs))
        // Policy endpoints
        .route("/api/config", get(handlers::get_global_policy))
        .route("/api/config/:hostname", get(handlers::get_host_policy))
        .route("/api/policies/update", post(handlers::update_policy))
        // Fleet endpoints
        .route("/api/heartbeat", post(handlers::heartbeat))
        .route("/api/fleet", get(handlers::get_fleet))
        .route("/api/fleet/wipe/:hostname", post(handlers::queue_wipe))
        .route("/api/fleet/lock/:hostname", post(handlers::queue_lock))
        // Screenshot evidence
        .nest_service("/static/screenshots", screenshots)
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}

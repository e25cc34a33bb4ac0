use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::coordinator::CoordinationService;
use crate::error::{CanaryError, Result};
use crate::persistence::ForensicLog;

/// Prepare the vault directories and wire the coordination service
pub async fn build_app_state(config: &AppConfig) -> Result<AppState> {
    let screenshots_dir = config.vault.screenshots_path();
    tokio::fs::create_dir_all(&screenshots_dir)
        .await
        .map_err(|e| {
            CanaryError::Persistence(format!(
                "failed to create screenshot vault {}: {}",
                screenshots_dir.display(),
                e
            ))
        })?;

    let log = ForensicLog::open(config.vault.log_path()).await?;
    info!(path = %log.path().display(), "Forensic vault ready");

    let service = Arc::new(CoordinationService::new(config.policy.clone(), log));
    Ok(AppState::new(service, screenshots_dir))
}

/// Start the coordination API server and run until ctrl-c
pub async fn start_api_server(config: &AppConfig) -> Result<()> {
    let app_state = build_app_state(config).await?;
    let app = create_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .map_err(|e| {
            CanaryError::Validation(format!(
                "invalid listen address {}:{}: {}",
                config.server.bind, config.server.port, e
            ))
        })?;
    info!("🛡️  Canary vault listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

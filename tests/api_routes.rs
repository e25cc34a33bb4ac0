use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use canary_mesh::{
    api::{create_router, AppState},
    coordinator::CoordinationService,
    domain::Policy,
    persistence::ForensicLog,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestVault {
    _dir: TempDir,
    app: Router,
    service: Arc<CoordinationService>,
}

impl TestVault {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let screenshots = dir.path().join("screenshots");
        std::fs::create_dir_all(&screenshots).expect("screenshots dir");
        std::fs::write(screenshots.join("snap_1_ws-01.png"), b"\x89PNG").expect("png");

        let log = ForensicLog::open(dir.path().join("security_log.txt"))
            .await
            .expect("forensic log");
        let global = Policy {
            watch_paths: vec!["C:\\CanaryTest".to_string()],
            extensions: vec![".txt".to_string()],
            ..Default::default()
        };
        let service = Arc::new(CoordinationService::new(global, log));
        let app = create_router(AppState::new(service.clone(), screenshots));

        Self {
            _dir: dir,
            app,
            service,
        }
    }
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = if let Some(payload) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("failed to build json request")
    } else {
        builder
            .body(Body::empty())
            .expect("failed to build empty request")
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn heartbeat(app: &Router, hostname: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/heartbeat",
        Some(json!({"hostname": hostname, "ip": "10.0.0.7", "current_path": "[]"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let vault = TestVault::new().await;
    let (status, body) = send_json(&vault.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn queued_command_is_delivered_exactly_once() {
    let vault = TestVault::new().await;

    assert_eq!(heartbeat(&vault.app, "ws-01").await["command"], Value::Null);

    let (status, body) =
        send_json(&vault.app, Method::POST, "/api/fleet/wipe/ws-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "wipe_queued");

    // Another host's heartbeat does not drain ws-01's slot.
    assert_eq!(heartbeat(&vault.app, "ws-02").await["command"], Value::Null);

    let first = heartbeat(&vault.app, "ws-01").await;
    assert_eq!(first["status"], "ok");
    assert_eq!(first["command"], "WIPE_CANARIES");
    assert_eq!(heartbeat(&vault.app, "ws-01").await["command"], Value::Null);
}

#[tokio::test]
async fn later_command_replaces_pending_one() {
    let vault = TestVault::new().await;

    send_json(&vault.app, Method::POST, "/api/fleet/wipe/ws-01", None).await;
    let (_, body) = send_json(&vault.app, Method::POST, "/api/fleet/lock/ws-01", None).await;
    assert_eq!(body["status"], "lock_queued");

    assert_eq!(heartbeat(&vault.app, "ws-01").await["command"], "LOCK_WORKSTATION");
    assert_eq!(heartbeat(&vault.app, "ws-01").await["command"], Value::Null);
}

#[tokio::test]
async fn commands_can_be_queued_for_unknown_hosts() {
    let vault = TestVault::new().await;
    send_json(&vault.app, Method::POST, "/api/fleet/lock/ghost", None).await;

    let (_, fleet) = send_json(&vault.app, Method::GET, "/api/fleet", None).await;
    assert!(fleet.get("ghost").is_none());
    assert_eq!(heartbeat(&vault.app, "ghost").await["command"], "LOCK_WORKSTATION");
}

#[tokio::test]
async fn fleet_lists_heartbeating_hosts() {
    let vault = TestVault::new().await;
    heartbeat(&vault.app, "ws-01").await;

    let (status, fleet) = send_json(&vault.app, Method::GET, "/api/fleet", None).await;
    assert_eq!(status, StatusCode::OK);
    let host = &fleet["ws-01"];
    assert_eq!(host["ip"], "10.0.0.7");
    assert_eq!(host["status"], "ONLINE");
    assert_eq!(host["current_path"], "[]");
    assert!(host["last_seen"].as_str().unwrap().ends_with("s ago"));
}

#[tokio::test]
async fn host_override_shadows_global_policy() {
    let vault = TestVault::new().await;

    let (status, body) = send_json(
        &vault.app,
        Method::POST,
        "/api/policies/update",
        Some(json!({
            "watch_path": " /srv/bait , ,/home/finance ",
            "watch_files": "",
            "extensions": [".pdf"],
            "auto_lock": true,
            "is_global": false,
            "hostname": "ws-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, host) = send_json(&vault.app, Method::GET, "/api/config/ws-01", None).await;
    assert_eq!(host["watch_paths"], json!(["/srv/bait", "/home/finance"]));
    assert_eq!(host["watch_files"], json!([]));
    assert_eq!(host["extensions"], json!([".pdf"]));
    assert_eq!(host["auto_lock"], true);

    let (_, other) = send_json(&vault.app, Method::GET, "/api/config/ws-02", None).await;
    assert_eq!(other["watch_paths"], json!(["C:\\CanaryTest"]));

    let (_, global) = send_json(&vault.app, Method::GET, "/api/config", None).await;
    assert_eq!(global["auto_lock"], false);
}

#[tokio::test]
async fn global_update_replaces_whole_policy() {
    let vault = TestVault::new().await;

    send_json(
        &vault.app,
        Method::POST,
        "/api/policies/update",
        Some(json!({"watch_path": "/opt/decoys", "is_global": true})),
    )
    .await;

    let (_, global) = send_json(&vault.app, Method::GET, "/api/config", None).await;
    assert_eq!(global["watch_paths"], json!(["/opt/decoys"]));
    // Omitted fields are reset, not merged.
    assert_eq!(global["extensions"], json!([]));
    assert_eq!(global["auto_lock"], false);
}

#[tokio::test]
async fn host_update_without_hostname_is_rejected() {
    let vault = TestVault::new().await;
    let (status, body) = send_json(
        &vault.app,
        Method::POST,
        "/api/policies/update",
        Some(json!({"watch_path": "/x", "is_global": false})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(vault.service.policy_store().override_count().await, 0);
}

#[tokio::test]
async fn alerts_are_listed_newest_first() {
    let vault = TestVault::new().await;

    for file in ["/bait/a.txt", "/bait/b.txt"] {
        let (status, body) = send_json(
            &vault.app,
            Method::POST,
            "/api/alert",
            Some(json!({"hostname": "ws-01", "file_path": file, "image": "None"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "recorded");
    }

    let (status, body) = send_json(&vault.app, Method::GET, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["file"], "/bait/b.txt");
    assert_eq!(logs[1]["file"], "/bait/a.txt");
    assert_eq!(logs[0]["action"], "CRITICAL BREACH");
    assert_eq!(logs[0]["image"], Value::Null);
}

#[tokio::test]
async fn alert_defaults_missing_fields() {
    let vault = TestVault::new().await;
    send_json(&vault.app, Method::POST, "/api/alert", Some(json!({}))).await;

    let (_, body) = send_json(&vault.app, Method::GET, "/api/logs", None).await;
    assert_eq!(body["logs"][0]["hostname"], "UNKNOWN");
    assert_eq!(body["logs"][0]["file"], "N/A");
}

#[tokio::test]
async fn auto_lock_policy_queues_lock_on_breach() {
    let vault = TestVault::new().await;
    send_json(
        &vault.app,
        Method::POST,
        "/api/policies/update",
        Some(json!({"extensions": [".txt"], "auto_lock": true, "hostname": "ws-01"})),
    )
    .await;

    send_json(
        &vault.app,
        Method::POST,
        "/api/alert",
        Some(json!({"hostname": "ws-01", "file_path": "/bait/a.txt"})),
    )
    .await;
    send_json(
        &vault.app,
        Method::POST,
        "/api/alert",
        Some(json!({"hostname": "ws-02", "file_path": "/bait/a.txt"})),
    )
    .await;

    assert_eq!(heartbeat(&vault.app, "ws-01").await["command"], "LOCK_WORKSTATION");
    assert_eq!(heartbeat(&vault.app, "ws-02").await["command"], Value::Null);
}

#[tokio::test]
async fn delete_and_purge_logs() {
    let vault = TestVault::new().await;
    for file in ["/bait/a.txt", "/bait/b.txt"] {
        send_json(
            &vault.app,
            Method::POST,
            "/api/alert",
            Some(json!({"hostname": "ws-01", "file_path": file})),
        )
        .await;
    }

    let (_, body) = send_json(&vault.app, Method::GET, "/api/logs", None).await;
    let victim = body["logs"][1].clone();

    let (status, body) = send_json(
        &vault.app,
        Method::DELETE,
        "/api/logs/delete",
        Some(json!({"time": victim["time"], "file": victim["file"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = send_json(&vault.app, Method::GET, "/api/logs", None).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["file"], "/bait/b.txt");

    let (status, body) = send_json(&vault.app, Method::DELETE, "/api/logs/purge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = send_json(&vault.app, Method::GET, "/api/logs", None).await;
    assert_eq!(body["logs"], json!([]));
}

#[tokio::test]
async fn unwritable_log_fails_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the log file should be makes every append fail.
    let log_path = dir.path().join("security_log.txt");
    std::fs::create_dir_all(&log_path).unwrap();

    let global = Policy {
        auto_lock: true,
        ..Default::default()
    };
    let service = Arc::new(CoordinationService::new(global, ForensicLog::new(log_path)));
    let app = create_router(AppState::new(service.clone(), dir.path().to_path_buf()));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/alert",
        Some(json!({"hostname": "ws-01", "file_path": "/bait/a.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(service.command_queue().pending_count(), 0);
}

#[tokio::test]
async fn log_maintenance_failures_return_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("security_log.txt");
    std::fs::create_dir_all(&log_path).unwrap();

    let service = Arc::new(CoordinationService::new(
        Policy::default(),
        ForensicLog::new(log_path),
    ));
    let app = create_router(AppState::new(service, dir.path().to_path_buf()));

    let (status, body) = send_json(
        &app,
        Method::DELETE,
        "/api/logs/delete",
        Some(json!({"time": "10:00:00", "file": "/bait/a.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = send_json(&app, Method::DELETE, "/api/logs/purge", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn screenshots_are_served_statically() {
    let vault = TestVault::new().await;
    let response = vault
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/static/screenshots/snap_1_ws-01.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use frpc_panel::system::ServiceState;
use tower::ServiceExt;

use common::Harness;

#[tokio::test]
async fn status_is_running_only_when_active() {
    let h = Harness::new();

    let (_, body) = h.get("/api/status").await;
    assert_eq!(body["status"], "stopped");

    *h.manager.state.lock().unwrap() = Ok(ServiceState::Active);
    let (status, body) = h.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    *h.manager.state.lock().unwrap() = Err("Failed to connect to bus".into());
    let (_, body) = h.get("/api/status").await;
    assert_eq!(body["status"], "stopped");
}

#[tokio::test]
async fn logs_are_returned_verbatim() {
    let h = Harness::new();
    *h.manager.journal.lock().unwrap() = Ok("line one\nline two\n".into());

    let (status, body) = h.get("/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "line one\nline two\n");
}

#[tokio::test]
async fn unreadable_journal_is_500() {
    let h = Harness::new();
    *h.manager.journal.lock().unwrap() = Err("journalctl: command not found".into());

    let (status, body) = h.get("/api/logs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("获取日志失败: "));
}

#[tokio::test]
async fn service_status_is_best_effort() {
    let h = Harness::new();
    *h.manager.state.lock().unwrap() = Ok(ServiceState::Activating);

    let (status, body) = h.get("/api/service-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "activating");
    assert!(body["info"].as_str().unwrap().contains("frpc.service"));

    *h.manager.state.lock().unwrap() = Err("bus unreachable".into());
    let (status, body) = h.get("/api/service-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "");
}

#[tokio::test]
async fn health_and_request_id() {
    let h = Harness::new();
    let resp = h
        .app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "panel.req-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-request-id"], "panel.req-7");

    let (_, body) = h.get("/health").await;
    assert_eq!(body["service"], "frpc-panel");
    assert_eq!(body["frpcInstalled"], false);
    h.install_fake_binary();
    let (_, body) = h.get("/health").await;
    assert_eq!(body["frpcInstalled"], true);

    let resp = h
        .app()
        .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 32);
}

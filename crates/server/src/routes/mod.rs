//! HTTP routes.

pub mod parse;
pub mod session;
pub mod system;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    let cors = if server.enable_cors {
        let origins = server
            .cors_origins
            .iter()
            .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Same-origin only
        CorsLayer::new()
    };

    let request_timeout = Duration::from_secs(server.request_timeout_secs);
    let body_limit = server.max_upload_bytes;

    let api_router = Router::new()
        .route("/api/parse", post(parse::create_session_handler))
        .route(
            "/api/sessions/{id}",
            get(session::summary_handler).delete(session::delete_handler),
        )
        .route("/api/sessions/{id}/entries", get(session::entries_handler))
        .route("/api/sessions/{id}/grouped", get(session::grouped_handler))
        .route("/api/sessions/{id}/keys", get(session::keys_handler));

    Router::new()
        .route("/", get(system::root_handler))
        .route("/health", get(system::health_handler))
        .route("/metrics", get(system::metrics_handler))
        .route("/parse", post(parse::parse_handler))
        .merge(api_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "tablog-test-boundary";

    const DRPC_LOG: &str = "2024-01-01T00:00:03.000Z\tERROR\tcontroller.drpc\tdrpc.go:88\tFailed to place\t{\"name\":\"busybox\",\"obj\":{\"ns\":\"apps\"}}\n\
goroutine 7 [running]:\n\
\tmain.place()\n\
2024-01-01T00:00:01.000Z\tINFO\tcontroller.drpc\tdrpc.go:10\tReconciling\t{\"name\":\"busybox\"}\n";

    const VRG_LOG: &str = "not a log line\n\
2024-01-01T00:00:02.000Z\tWARN\tcontroller.vrg\tvrg.go:5\tRetrying\t{\"name\":\"mysql\"}\n\
\n\
2024-01-01T00:00:04.000Z\tINFO\tpkg/foo.go:42\tno logger\n";

    fn app_with(config: ServerConfig) -> (AppState, Router) {
        let state = AppState::new(config);
        (state.clone(), build_router(state))
    }

    fn app() -> (AppState, Router) {
        app_with(ServerConfig::default())
    }

    fn multipart(files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, contents) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn upload(app: &Router) -> String {
        let (status, body) = send(app, multipart(&[("drpc.log", DRPC_LOG), ("vrg.log", VRG_LOG)])).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["sessionId"].as_str().unwrap().to_string()
    }

    // ── Service ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app();
        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    // ── Stateless parse ──────────────────────────────────────────

    #[tokio::test]
    async fn test_parse_returns_ordered_entries() {
        let (_, app) = app();
        let mut req = multipart(&[("drpc.log", DRPC_LOG), ("vrg.log", VRG_LOG)]);
        *req.uri_mut() = "/parse".parse().unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 5);

        let messages: Vec<&str> = entries.iter().map(|e| e["message"].as_str().unwrap()).collect();
        assert_eq!(messages[..4], ["Reconciling", "Retrying", "Failed to place", "no logger"]);

        assert_eq!(entries[2]["stackTrace"].as_array().unwrap().len(), 2);
        assert_eq!(entries[2]["filename"], "drpc.log");
        assert_eq!(entries[3]["logger"], "unknown logger");
        assert_eq!(entries[4]["isValid"], false);
        assert_eq!(entries[4]["raw"], "not a log line");
    }

    #[tokio::test]
    async fn test_parse_without_files_is_bad_request() {
        let (state, app) = app();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No files uploaded");
        assert_eq!(state.uploads.failed(), 1);
    }

    #[tokio::test]
    async fn test_oversized_line_is_unprocessable() {
        let mut config = ServerConfig::default();
        config.parser.max_line_bytes = 16;
        let (state, app) = app_with(config);

        let (status, body) = send(&app, multipart(&[("big.log", DRPC_LOG)])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("big.log"));
        assert!(state.sessions.is_empty());
    }

    // ── Sessions ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_session() {
        let (state, app) = app();
        let (status, body) = send(&app, multipart(&[("drpc.log", DRPC_LOG), ("vrg.log", VRG_LOG)])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["totalEntries"], 5);
        assert_eq!(body["filenames"], serde_json::json!(["drpc.log", "vrg.log"]));
        assert_eq!(body["levelStats"]["INFO"], 2);
        assert_eq!(body["levelStats"]["INVALID"], 1);
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.uploads.files(), 2);
    }

    #[tokio::test]
    async fn test_entries_paginated_and_filtered() {
        let (_, app) = app();
        let id = upload(&app).await;

        let (status, body) = send(&app, get_req(&format!("/api/sessions/{id}/entries?pageSize=2&page=2"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["hasNext"], true);
        assert_eq!(body["totalUnfiltered"], 5);

        let (_, body) = send(
            &app,
            get_req(&format!("/api/sessions/{id}/entries?logger=DRPC&showInvalid=false")),
        )
        .await;
        assert_eq!(body["entries"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["totalEntries"], 2);

        let (_, body) = send(&app, get_req(&format!("/api/sessions/{id}/entries?level=ERROR"))).await;
        assert_eq!(body["entries"][0]["message"], "Failed to place");
    }

    #[tokio::test]
    async fn test_grouped() {
        let (_, app) = app();
        let id = upload(&app).await;

        let (status, body) = send(&app, get_req(&format!("/api/sessions/{id}/grouped?groupBy=name"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalGroups"], 2);
        assert_eq!(body["groups"][0]["keyValue"], "busybox");
        assert_eq!(body["groups"][0]["count"], 2);
        assert_eq!(body["groups"][0]["hasErrors"], true);
        assert_eq!(body["groups"][0]["durationMs"], 2000);
        assert_eq!(body["groups"][1]["keyValue"], "mysql");
        assert_eq!(body["totalUngrouped"], 2);

        let (_, body) = send(&app, get_req(&format!("/api/sessions/{id}/grouped?groupBy=obj.ns"))).await;
        assert_eq!(body["groups"][0]["keyValue"], "apps");
    }

    #[tokio::test]
    async fn test_grouped_requires_key() {
        let (_, app) = app();
        let id = upload(&app).await;

        let (status, body) = send(&app, get_req(&format!("/api/sessions/{id}/grouped"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("groupBy"));
    }

    #[tokio::test]
    async fn test_keys() {
        let (_, app) = app();
        let id = upload(&app).await;

        let (status, body) = send(&app, get_req(&format!("/api/sessions/{id}/keys"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keys"], serde_json::json!(["name", "obj.ns"]));
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let (state, app) = app();
        let id = upload(&app).await;

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/api/sessions/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.sessions.is_empty());

        let (status, _) = send(&app, get_req(&format!("/api/sessions/{id}/entries"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_session_ids() {
        let (_, app) = app();
        let (status, _) = send(&app, get_req(&format!("/api/sessions/{}/keys", uuid::Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get_req("/api/sessions/not-a-uuid/keys")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_uploads_keep_separate_sessions() {
        let (_, app) = app();
        let first = upload(&app).await;
        let (_, body) = send(&app, multipart(&[("vrg.log", VRG_LOG)])).await;
        let second = body["sessionId"].as_str().unwrap().to_string();

        let (_, a) = send(&app, get_req(&format!("/api/sessions/{first}"))).await;
        let (_, b) = send(&app, get_req(&format!("/api/sessions/{second}"))).await;
        assert_eq!(a["totalEntries"], 5);
        assert_eq!(b["totalEntries"], 3);
    }

    // ── Metrics ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_metrics_reflect_uploads() {
        let (_, app) = app();
        upload(&app).await;

        let (status, body) = send(&app, get_req("/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uploads"]["accepted"], 1);
        assert_eq!(body["sessions"]["active"], 1);
        assert_eq!(body["parsing"]["files"], 2);
        assert_eq!(body["parsing"]["continuation_lines"], 2);
        assert_eq!(body["parsing"]["loggers_recovered"], 1);
    }
}

//! Service endpoints — root, health and metrics.

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Root handler - shows API info
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "Tablog Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "parse": "POST /parse",
            "sessions": "POST /api/parse",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<Value> {
    let uploads = &state.uploads;
    let sessions = &state.sessions;

    Json(json!({
        "parsing": state.parsing.snapshot(),
        "uploads": {
            "accepted": uploads.accepted(),
            "failed": uploads.failed(),
            "files": uploads.files(),
            "total_bytes": uploads.bytes(),
            "total_mb": (uploads.bytes() as f64) / (1024.0 * 1024.0)
        },
        "sessions": {
            "active": sessions.len(),
            "created": sessions.created(),
            "evicted": sessions.evicted(),
            "max": state.config.sessions.max_sessions
        }
    }))
}

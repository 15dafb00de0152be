//! Session queries — filtered pages, grouping and detail keys.

use analyzer::logs::{all_keys, group_by, EntryFilter, PageRequest};
use analyzer::LogLevel;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::AppState;

/// Query string shared by the entries and grouped endpoints.
///
/// Numbers are parsed leniently: anything unparsable falls back to the
/// default. `showInvalid` is true unless it is exactly `false`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntriesQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub timestamp: String,
    pub level: String,
    pub logger: String,
    pub file_position: String,
    pub message: String,
    pub details: String,
    pub filename: String,
    pub show_invalid: Option<String>,
    pub group_by: Option<String>,
}

impl EntriesQuery {
    pub fn filter(&self) -> ApiResult<EntryFilter> {
        let level = match self.level.trim() {
            "" => None,
            level => Some(
                level
                    .parse::<LogLevel>()
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
            ),
        };

        Ok(EntryFilter {
            timestamp: self.timestamp.clone(),
            level,
            logger: self.logger.clone(),
            file_position: self.file_position.clone(),
            message: self.message.clone(),
            details: self.details.clone(),
            filename: self.filename.clone(),
            show_invalid: self.show_invalid.as_deref() != Some("false"),
        })
    }

    pub fn page_request(&self, default_page_size: usize) -> PageRequest {
        PageRequest::new(
            lenient(self.page.as_deref()).unwrap_or(1),
            lenient(self.page_size.as_deref()).unwrap_or(default_page_size),
        )
    }
}

fn lenient(value: Option<&str>) -> Option<usize> {
    value?.trim().parse().ok().filter(|n| *n > 0)
}

fn lookup(state: &AppState, id: &str) -> ApiResult<Arc<Session>> {
    let id = Uuid::parse_str(id)
        .map_err(|_| ApiError::InvalidRequest(format!("invalid session id: {}", id)))?;
    state.sessions.get(&id).ok_or(ApiError::SessionNotFound(id))
}

/// GET /api/sessions/{id}/entries
pub async fn entries_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<Value>> {
    let session = lookup(&state, &id)?;
    let filtered = query.filter()?.apply(&session.entries);

    let parser = &state.config.parser;
    let page = query
        .page_request(parser.default_page_size)
        .apply(&filtered, parser.max_page_size);

    Ok(Json(json!({
        "entries": page.items,
        "pagination": page.pagination,
        "totalUnfiltered": session.entries.len(),
    })))
}

/// GET /api/sessions/{id}/grouped?groupBy=key
pub async fn grouped_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<Value>> {
    let key = query
        .group_by
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("groupBy parameter is required".to_string()))?;

    let session = lookup(&state, &id)?;
    let filtered = query.filter()?.apply(&session.entries);
    let grouping = group_by(filtered, key);

    serde_json::to_value(grouping)
        .map(Json)
        .map_err(|e| ApiError::Internal(format!("failed to encode groups: {}", e)))
}

/// GET /api/sessions/{id}/keys
pub async fn keys_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = lookup(&state, &id)?;
    Ok(Json(json!({ "keys": all_keys(&session.entries) })))
}

/// GET /api/sessions/{id}
pub async fn summary_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = lookup(&state, &id)?;
    Ok(Json(json!({
        "sessionId": session.id,
        "createdAt": session.created_at.to_rfc3339(),
        "totalEntries": session.entries.len(),
        "filenames": session.filenames,
        "levelStats": session.level_stats,
    })))
}

/// DELETE /api/sessions/{id}
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = lookup(&state, &id)?;
    state.sessions.remove(&session.id);
    tracing::info!(session_id = %session.id, "Session deleted");

    Ok(Json(json!({
        "status": "deleted",
        "sessionId": session.id,
    })))
}

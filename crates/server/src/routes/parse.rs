//! Upload parsing — `POST /parse` and `POST /api/parse`.

use analyzer::stream::BatchError;
use analyzer::{LogEntry, ParseBatch};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying log files.
pub const FILES_FIELD: &str = "files";

struct Upload {
    filename: String,
    data: Bytes,
}

/// POST /parse — stateless: ordered entries of every uploaded file
pub async fn parse_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let (_, entries) = parse_request(&state, multipart).await?;
    Ok(Json(json!({ "entries": entries })))
}

/// POST /api/parse — parse and keep the result as a session
pub async fn create_session_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let (filenames, entries) = parse_request(&state, multipart).await?;
    let session = state.sessions.create(filenames, entries);

    info!(
        session_id = %session.id,
        files = session.filenames.len(),
        entries = session.entries.len(),
        "Upload parsed into session"
    );

    Ok(Json(json!({
        "success": true,
        "sessionId": session.id,
        "totalEntries": session.entries.len(),
        "filenames": session.filenames,
        "levelStats": session.level_stats,
    })))
}

async fn parse_request(
    state: &AppState,
    multipart: Multipart,
) -> ApiResult<(Vec<String>, Vec<LogEntry>)> {
    let result = match read_uploads(state, multipart).await {
        Ok(uploads) => parse_uploads(state, uploads).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(_) => state.uploads.upload_accepted(),
        Err(_) => state.uploads.upload_failed(),
    }
    result
}

async fn read_uploads(state: &AppState, mut multipart: Multipart) -> ApiResult<Vec<Upload>> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", uploads.len() + 1));
        let data = field.bytes().await?;

        state.uploads.file_received(data.len());
        uploads.push(Upload { filename, data });
    }

    if uploads.is_empty() {
        return Err(ApiError::NoFiles);
    }
    Ok(uploads)
}

/// Files are parsed one after another on a blocking thread, each with its
/// own assembler, then ordered together.
async fn parse_uploads(
    state: &AppState,
    uploads: Vec<Upload>,
) -> ApiResult<(Vec<String>, Vec<LogEntry>)> {
    let max_line_bytes = state.config.parser.max_line_bytes;
    let metrics = state.parsing.clone();

    let parsed = tokio::task::spawn_blocking(move || {
        let mut batch = ParseBatch::new(max_line_bytes).with_metrics(metrics);
        for upload in &uploads {
            batch.add_source(&upload.filename, upload.data.as_ref())?;
        }
        let filenames = batch.filenames().to_vec();
        Ok::<_, BatchError>((filenames, batch.finish()))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("parse task failed: {}", e)))??;

    Ok(parsed)
}

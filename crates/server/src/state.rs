use crate::config::ServerConfig;
use crate::metrics::UploadMetrics;
use crate::session::SessionStore;
use analyzer::parser::ParsingMetrics;
use std::sync::Arc;

/// Shared application state (thread-safe)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionStore>,
    /// Line-level counters fed by every parse
    pub parsing: Arc<ParsingMetrics>,
    pub uploads: UploadMetrics,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.sessions.max_sessions));

        Self {
            config: Arc::new(config),
            sessions,
            parsing: Arc::new(ParsingMetrics::new()),
            uploads: UploadMetrics::new(),
        }
    }
}

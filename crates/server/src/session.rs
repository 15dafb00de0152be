//! Session store — parsed uploads kept in memory under a generated id.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use analyzer::logs::level_stats;
use analyzer::LogEntry;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// One upload's ordered entries.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub filenames: Vec<String>,
    pub entries: Vec<LogEntry>,
    pub level_stats: BTreeMap<String, usize>,
    seq: u64,
}

pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    max_sessions: usize,
    next_seq: AtomicU64,
    evicted: AtomicU64,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
            next_seq: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Store a new session, evicting the oldest ones beyond capacity.
    pub fn create(&self, filenames: Vec<String>, entries: Vec<LogEntry>) -> Arc<Session> {
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            level_stats: level_stats(&entries),
            filenames,
            entries,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        });

        self.sessions.insert(session.id, session.clone());
        self.evict_over_capacity();

        tracing::debug!(
            session_id = %session.id,
            entries = session.entries.len(),
            active = self.sessions.len(),
            "Session created"
        );
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn created(&self) -> u64 {
        self.next_seq.load(Ordering::Relaxed)
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn evict_over_capacity(&self) {
        while self.sessions.len() > self.max_sessions {
            // Collect before removing so no shard lock is held across remove()
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|s| s.value().seq)
                .map(|s| *s.key());

            let Some(id) = oldest else { break };
            if self.sessions.remove(&id).is_some() {
                self.evicted.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(session_id = %id, "Session evicted");
            }
        }
    }
}

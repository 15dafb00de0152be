use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Upload request counters
#[derive(Clone, Default)]
pub struct UploadMetrics {
    inner: Arc<UploadMetricsInner>,
}

#[derive(Default)]
struct UploadMetricsInner {
    /// Parse requests that produced entries
    accepted: AtomicU64,

    /// Parse requests rejected or failed
    failed: AtomicU64,

    /// Files received across all uploads
    files: AtomicU64,

    /// Raw upload bytes received
    bytes: AtomicU64,
}

impl UploadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per file read from a multipart body
    pub fn file_received(&self, bytes: usize) {
        self.inner.files.fetch_add(1, Ordering::Relaxed);
        self.inner.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn upload_accepted(&self) {
        self.inner.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upload_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> u64 {
        self.inner.accepted.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    pub fn files(&self) -> u64 {
        self.inner.files.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.inner.bytes.load(Ordering::Relaxed)
    }
}

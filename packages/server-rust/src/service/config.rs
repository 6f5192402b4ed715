//! Service configuration for ingestion sessions.

/// Mutations buffered before a mid-stream flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;

/// Knobs for the streaming ingestion pipeline.
///
/// Connection settings and credentials are deliberately absent: the storage
/// gateway is constructed by the process bootstrap and handed in already
/// live.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Batch size at which a mid-stream flush is triggered.
    pub flush_threshold: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

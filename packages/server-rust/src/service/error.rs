//! Service-level error taxonomy.
//!
//! Every failure aborts the whole in-flight session or query: one terminal
//! error with a human-readable reason, no partial summaries, no silent
//! drops. Writes that reached storage before the failure are not rolled
//! back (documented non-atomicity of unlogged batching).

use catalog_core::ValidationError;

/// Transport-facing classification of a [`ServiceError`].
///
/// Maps one-to-one onto invalid-argument / not-found / internal status
/// codes at the RPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidArgument,
    NotFound,
    Internal,
    Cancelled,
}

/// Errors surfaced by ingestion sessions and query executions.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing required field. Caller error, never retried.
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// Non-paginated lookup matched nothing. Deliberately distinct from an
    /// empty-but-successful paginated page.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Batch execution, scan iteration, or scan close failed. Retry, if
    /// any, is the storage gateway's responsibility beneath this layer.
    #[error("storage operation failed: {0}")]
    Storage(#[source] anyhow::Error),

    /// Error receiving on the inbound record stream.
    #[error("error reading record stream: {0}")]
    Transport(#[source] anyhow::Error),

    /// The caller's deadline or cancellation fired mid-request.
    #[error("request cancelled")]
    Cancelled,
}

impl ServiceError {
    /// The transport-facing class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::InvalidArgument,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Storage(_) | Self::Transport(_) => ErrorClass::Internal,
            Self::Cancelled => ErrorClass::Cancelled,
        }
    }
}

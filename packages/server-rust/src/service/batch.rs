//! Bounded accumulation of storage mutations.
//!
//! Buffers validated write operations and submits them as one unlogged
//! multi-operation batch when the flush threshold is reached or the input
//! stream ends. On a failed flush the batch is retained and the error
//! propagates -- callers abort the stream rather than retry here.

use crate::storage::{Mutation, StorageGateway};

/// An ordered batch of pending mutations with a flush threshold.
#[derive(Debug)]
pub struct MutationBatch {
    pending: Vec<Mutation>,
    threshold: usize,
}

impl MutationBatch {
    /// Creates an empty batch that flushes at `threshold` operations.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            pending: Vec::new(),
            threshold,
        }
    }

    /// Buffers one mutation. Does not execute anything.
    pub fn append(&mut self, mutation: Mutation) {
        self.pending.push(mutation);
    }

    /// Number of buffered mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the batch holds no mutations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the batch has reached its flush threshold.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        self.pending.len() >= self.threshold
    }

    /// Submits the whole batch as one multi-operation request.
    ///
    /// On success the batch is emptied for reuse. On failure the buffered
    /// mutations are retained and the gateway error propagates.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error when batch execution fails.
    pub async fn flush(&mut self, gateway: &dyn StorageGateway) -> anyhow::Result<()> {
        gateway.execute_batch(&self.pending).await?;
        tracing::debug!(size = self.pending.len(), "flushed mutation batch");
        self.pending.clear();
        Ok(())
    }

    /// Drain-time flush: a no-op when the batch is empty, so stream end
    /// never issues a vacuous write.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error when batch execution fails.
    pub async fn flush_if_non_empty(&mut self, gateway: &dyn StorageGateway) -> anyhow::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.flush(gateway).await
    }
}

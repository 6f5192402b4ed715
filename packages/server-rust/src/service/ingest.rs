//! Streaming ingestion controller.
//!
//! Drives a receive loop over one client-streamed record sequence:
//! validate, mint a row key, buffer the mutation, flush full batches
//! mid-stream, flush the tail at end-of-stream, and emit exactly one
//! terminal [`IngestionSummary`].
//!
//! One generic controller serves all three entity kinds through
//! [`CatalogRecord`] instead of three copy-pasted receive loops. A session
//! is strictly sequential; its only suspension points are the next-record
//! receive and gateway batch executions, with cooperative cancellation
//! checked between them.
//!
//! Failure semantics: any validation, transport, or storage failure aborts
//! the whole session with no summary. Batches already flushed before the
//! failure stay in storage -- unlogged batching is deliberately non-atomic
//! across the session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use catalog_core::{
    require_id, CategoryRecord, IdentityGenerator, IngestionSummary, MovieRecord, UserRecord,
    Validate, ValidationError,
};

use crate::service::batch::MutationBatch;
use crate::service::cancel::Cancellation;
use crate::service::config::ServiceConfig;
use crate::service::error::ServiceError;
use crate::storage::{Mutation, MovieRow, StorageGateway};

/// Inbound end of a client record stream.
///
/// Transport adapters implement this over their own framing; tests drive it
/// with a channel.
#[async_trait]
pub trait RecordStream: Send {
    type Record: Send;

    /// Pulls the next record. `Ok(None)` is the caller's end-of-stream
    /// signal; an error is a transport failure and aborts the session.
    async fn next_record(&mut self) -> anyhow::Result<Option<Self::Record>>;
}

/// Channel-backed stream: each element is either one record or a transport
/// failure; a closed channel is end-of-stream.
#[async_trait]
impl<R: Send + 'static> RecordStream for mpsc::Receiver<anyhow::Result<R>> {
    type Record = R;

    async fn next_record(&mut self) -> anyhow::Result<Option<R>> {
        match self.recv().await {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

/// A write record the generic ingestion controller can drive: structural
/// validation plus conversion into a keyed storage mutation.
pub trait CatalogRecord: Validate + Send + 'static {
    /// Lowercase plural kind, used in logs.
    const KIND: &'static str;
    /// Capitalized plural kind, used in summary messages.
    const DISPLAY: &'static str;

    /// Builds the storage mutation for this record under the minted row key.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when an embedded identifier fails to
    /// parse. Unreachable after [`Validate::validate`] has passed, but
    /// propagated rather than unwrapped.
    fn into_mutation(self, id: Uuid) -> Result<Mutation, ValidationError>;
}

impl CatalogRecord for UserRecord {
    const KIND: &'static str = "users";
    const DISPLAY: &'static str = "Users";

    fn into_mutation(self, id: Uuid) -> Result<Mutation, ValidationError> {
        Ok(Mutation::InsertUser {
            id,
            name: self.name,
            alias_name: self.alias_name,
        })
    }
}

impl CatalogRecord for CategoryRecord {
    const KIND: &'static str = "categories";
    const DISPLAY: &'static str = "Categories";

    fn into_mutation(self, id: Uuid) -> Result<Mutation, ValidationError> {
        Ok(Mutation::InsertCategory {
            id,
            name: self.name,
            description: self.description,
        })
    }
}

impl CatalogRecord for MovieRecord {
    const KIND: &'static str = "movies";
    const DISPLAY: &'static str = "Movies";

    fn into_mutation(self, id: Uuid) -> Result<Mutation, ValidationError> {
        let owner_id = require_id("movie", "ownerId", &self.owner_id)?;
        let category_id = require_id("movie", "categoryId", &self.category_id)?;
        Ok(Mutation::InsertMovie(MovieRow {
            id,
            owner_id,
            category_id,
            name: self.name,
            banner_ref: self.banner_ref,
            content_ref: self.content_ref,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Sequential drain of one inbound record stream into batched mutations.
///
/// Shared by all sessions; each `ingest` call owns its own batch and
/// summary, nothing session-local escapes into the gateway.
pub struct IngestionController {
    gateway: Arc<dyn StorageGateway>,
    ids: Arc<dyn IdentityGenerator>,
    config: ServiceConfig,
}

impl IngestionController {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        ids: Arc<dyn IdentityGenerator>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            gateway,
            ids,
            config,
        }
    }

    /// Runs one ingestion session to its terminal state.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] -- a malformed record anywhere in the
    ///   stream; the whole session fails rather than silently dropping it
    /// - [`ServiceError::Transport`] -- the stream failed mid-receive
    /// - [`ServiceError::Storage`] -- a mid-stream or drain flush failed
    /// - [`ServiceError::Cancelled`] -- the caller's deadline fired
    pub async fn ingest<S>(
        &self,
        mut stream: S,
        cancel: &Cancellation,
    ) -> Result<IngestionSummary, ServiceError>
    where
        S: RecordStream,
        S::Record: CatalogRecord,
    {
        let kind = <S::Record as CatalogRecord>::KIND;
        let mut batch = MutationBatch::new(self.config.flush_threshold);
        let mut accepted: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::warn!(kind, accepted, "ingestion session cancelled");
                return Err(ServiceError::Cancelled);
            }

            let record = match stream.next_record().await {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(kind, accepted, "transport error on record stream");
                    return Err(ServiceError::Transport(err));
                }
            };

            // Validation precedes identity generation: a rejected record
            // never consumes a row key and never counts as accepted.
            record.validate()?;
            let id = self.ids.new_time_ordered_id();
            batch.append(record.into_mutation(id)?);
            accepted += 1;

            if batch.should_flush() {
                if cancel.is_cancelled() {
                    return Err(ServiceError::Cancelled);
                }
                batch
                    .flush(self.gateway.as_ref())
                    .await
                    .map_err(ServiceError::Storage)?;
            }
        }

        // Drain: the tail batch may be empty after an exact-threshold flush.
        batch
            .flush_if_non_empty(self.gateway.as_ref())
            .await
            .map_err(ServiceError::Storage)?;

        tracing::info!(kind, accepted, "ingestion session complete");
        Ok(IngestionSummary {
            message: format!(
                "{} created successfully",
                <S::Record as CatalogRecord>::DISPLAY
            ),
            accepted,
        })
    }
}

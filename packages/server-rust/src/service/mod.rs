//! The ingestion and query core of the catalog server.
//!
//! 1. **Batching** (`batch`): bounded mutation accumulation with mid-stream
//!    flushing
//! 2. **Ingestion** (`ingest`): the generic receive-loop over one inbound
//!    record stream
//! 3. **Queries** (`query`): cursor-paginated movie scans and point lookups
//! 4. **Cancellation** (`cancel`): cooperative cancel pair threaded through
//!    every blocking call
//! 5. **Errors** (`error`): the service-wide failure taxonomy

pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod ingest;
pub mod query;

// Re-export key types for convenient access.
pub use batch::MutationBatch;
pub use cancel::{CancelHandle, Cancellation};
pub use config::{ServiceConfig, DEFAULT_FLUSH_THRESHOLD};
pub use error::{ErrorClass, ServiceError};
pub use ingest::{CatalogRecord, IngestionController, RecordStream};
pub use query::QueryExecutor;

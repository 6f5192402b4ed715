//! Catalog Server -- batched streaming ingestion and cursor-paginated movie queries.
//!
//! The RPC surface, process bootstrap, and driver-backed storage are
//! external collaborators: they hand this crate a live
//! [`StorageGateway`](storage::StorageGateway) and an inbound
//! [`RecordStream`](service::RecordStream), and get back one terminal
//! summary or one terminal failure per invocation.

pub mod service;
pub mod storage;

pub use service::{
    CancelHandle, Cancellation, ErrorClass, IngestionController, QueryExecutor, ServiceConfig,
    ServiceError,
};
pub use storage::{MemoryGateway, StorageGateway};

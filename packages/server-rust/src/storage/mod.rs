//! Storage layer for the catalog server.
//!
//! - [`StorageGateway`]: the trait the ingestion and query core talks to --
//!   batched mutations, bounded cursor scans, point reads
//! - [`MemoryGateway`]: `DashMap`-backed implementation for development
//!   and tests

pub mod gateway;
pub mod memory;

pub use gateway::*;
pub use memory::*;

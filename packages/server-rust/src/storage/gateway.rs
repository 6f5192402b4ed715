//! Storage gateway trait and cursor-based scan types.
//!
//! Defines [`StorageGateway`], the seam between the ingestion/query core and
//! the wide-column store. Implementations own connection lifecycle, driver
//! retries, and session teardown; the core only submits batched mutations
//! and drives bounded scans through it.

use async_trait::async_trait;
use uuid::Uuid;

/// Opaque resume token for a bounded scan.
///
/// Implementations encode their internal position in the `state` field.
/// Consumers must treat `state` as opaque bytes and only check `finished` --
/// the token is threaded back unchanged on the next call.
#[derive(Debug, Clone)]
pub struct ScanCursor {
    /// Opaque state for the storage implementation to resume the scan.
    pub state: Vec<u8>,
    /// Whether the scan has completed (no further pages).
    pub finished: bool,
}

impl ScanCursor {
    /// Creates a cursor positioned at the beginning of the range.
    #[must_use]
    pub fn start() -> Self {
        Self {
            state: Vec::new(),
            finished: false,
        }
    }
}

/// One pending storage mutation, buffered into a batch before execution.
///
/// The three entity kinds are independent write paths: no foreign keys are
/// enforced between them at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    InsertUser {
        id: Uuid,
        name: String,
        alias_name: String,
    },
    InsertCategory {
        id: Uuid,
        name: String,
        description: String,
    },
    InsertMovie(MovieRow),
}

/// A decoded movie storage row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRow {
    /// Time-ordered row key minted at ingestion time.
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub banner_ref: String,
    pub content_ref: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A decoded user storage row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub alias_name: String,
}

/// Filter predicates for a bounded movie scan, one variant per query shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// All movies for one owner in one category.
    OwnerAndCategory { owner: Uuid, category: Uuid },
    /// All movies for one owner.
    Owner { owner: Uuid },
    /// One owner's movies with an exact name match.
    OwnerAndName { owner: Uuid, name: String },
}

/// A live bounded scan over movie rows.
///
/// Callers must call [`close`](RowScan::close) exactly once on every exit
/// path, including error exits, to release storage-side resources.
#[async_trait]
pub trait RowScan: Send {
    /// Yields the next row, or `None` when the current page is exhausted.
    async fn next_row(&mut self) -> anyhow::Result<Option<MovieRow>>;

    /// Resume token for the page after this one.
    ///
    /// Only meaningful once the page has been drained; `finished` signals
    /// that no further pages exist.
    fn paging_state(&self) -> ScanCursor;

    /// Releases the scan's storage-side resources.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Gateway to the wide-column store.
///
/// Long-lived and shared by all invocations as `Arc<dyn StorageGateway>`;
/// no session-local state escapes into it. Errors cross this boundary as
/// `anyhow::Error` and are classified at the service layer.
#[async_trait]
pub trait StorageGateway: Send + Sync + 'static {
    /// Executes all mutations as one unlogged multi-operation batch.
    ///
    /// Non-atomic across rows: the batch trades cross-row atomicity for
    /// write throughput. Acceptable because each record is independently
    /// keyed. On failure the caller still owns the mutations.
    async fn execute_batch(&self, mutations: &[Mutation]) -> anyhow::Result<()>;

    /// Opens a bounded scan restricted to `filter`.
    ///
    /// `page_size` caps the rows the returned scan yields (`None` iterates
    /// the full range in one page). `resume_state` is the opaque token from
    /// a previous page's [`ScanCursor`], absent on the first call.
    async fn scan(
        &self,
        filter: &ScanFilter,
        page_size: Option<u32>,
        resume_state: Option<Vec<u8>>,
    ) -> anyhow::Result<Box<dyn RowScan>>;

    /// Single-row user lookup by key. `None` when the key has no row.
    async fn read_user(&self, id: Uuid) -> anyhow::Result<Option<UserRow>>;
}

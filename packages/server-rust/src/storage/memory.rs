//! In-memory [`StorageGateway`] implementation backed by [`DashMap`].
//!
//! Provides concurrent access without external locking. Used for
//! development and tests; a driver-backed gateway for a real wide-column
//! store is an external collaborator and plugs in behind the same trait.
//!
//! Scans are served from a point-in-time snapshot ordered by row key, so a
//! fixed filter plus cursor sequence yields a stable order. Cursors encode
//! a plain offset into that ordering.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::gateway::{Mutation, MovieRow, RowScan, ScanCursor, ScanFilter, StorageGateway, UserRow};

/// A decoded category storage row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// In-memory gateway over three independent entity tables.
pub struct MemoryGateway {
    users: DashMap<Uuid, UserRow>,
    categories: DashMap<Uuid, CategoryRow>,
    movies: DashMap<Uuid, MovieRow>,
    batches_executed: AtomicU64,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            categories: DashMap::new(),
            movies: DashMap::new(),
            batches_executed: AtomicU64::new(0),
        }
    }

    /// Number of batch executions acknowledged so far.
    #[must_use]
    pub fn batches_executed(&self) -> u64 {
        self.batches_executed.load(Ordering::Relaxed)
    }

    /// Number of stored user rows.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored category rows.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of stored movie rows.
    #[must_use]
    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    /// Snapshot of all movie rows matching `filter`, ordered by row key.
    fn matching_movies(&self, filter: &ScanFilter) -> Vec<MovieRow> {
        let mut rows: Vec<MovieRow> = self
            .movies
            .iter()
            .filter(|entry| filter_matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.id);
        rows
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_matches(filter: &ScanFilter, row: &MovieRow) -> bool {
    match filter {
        ScanFilter::OwnerAndCategory { owner, category } => {
            row.owner_id == *owner && row.category_id == *category
        }
        ScanFilter::Owner { owner } => row.owner_id == *owner,
        ScanFilter::OwnerAndName { owner, name } => {
            row.owner_id == *owner && row.name == *name
        }
    }
}

/// Decodes a resume token into a row offset. An absent or empty token means
/// the start of the range.
fn decode_offset(state: Option<&[u8]>) -> usize {
    match state {
        None | Some([]) => 0,
        Some(bytes) => {
            let mut buf = [0u8; 8];
            let len = bytes.len().min(8);
            buf[..len].copy_from_slice(&bytes[..len]);
            // Offsets are bounded by table size, so truncation is safe.
            #[allow(clippy::cast_possible_truncation)]
            {
                u64::from_le_bytes(buf) as usize
            }
        }
    }
}

/// Encodes a row offset as resume-token bytes (little-endian `u64`).
fn encode_offset(offset: usize) -> Vec<u8> {
    (offset as u64).to_le_bytes().to_vec()
}

/// One page of a snapshot scan.
struct MemoryScan {
    rows: std::vec::IntoIter<MovieRow>,
    next: ScanCursor,
    closed: bool,
}

#[async_trait]
impl RowScan for MemoryScan {
    async fn next_row(&mut self) -> anyhow::Result<Option<MovieRow>> {
        if self.closed {
            anyhow::bail!("scan used after close");
        }
        Ok(self.rows.next())
    }

    fn paging_state(&self) -> ScanCursor {
        self.next.clone()
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            anyhow::bail!("scan closed twice");
        }
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn execute_batch(&self, mutations: &[Mutation]) -> anyhow::Result<()> {
        for mutation in mutations {
            match mutation.clone() {
                Mutation::InsertUser {
                    id,
                    name,
                    alias_name,
                } => {
                    self.users.insert(
                        id,
                        UserRow {
                            id,
                            name,
                            alias_name,
                        },
                    );
                }
                Mutation::InsertCategory {
                    id,
                    name,
                    description,
                } => {
                    self.categories.insert(
                        id,
                        CategoryRow {
                            id,
                            name,
                            description,
                        },
                    );
                }
                Mutation::InsertMovie(row) => {
                    self.movies.insert(row.id, row);
                }
            }
        }
        self.batches_executed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(size = mutations.len(), "executed mutation batch");
        Ok(())
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        page_size: Option<u32>,
        resume_state: Option<Vec<u8>>,
    ) -> anyhow::Result<Box<dyn RowScan>> {
        let matching = self.matching_movies(filter);
        let total = matching.len();
        let offset = decode_offset(resume_state.as_deref());

        let page: Vec<MovieRow> = matching
            .into_iter()
            .skip(offset)
            .take(page_size.map_or(usize::MAX, |size| size as usize))
            .collect();

        let new_offset = offset + page.len();
        let next = ScanCursor {
            state: encode_offset(new_offset),
            finished: new_offset >= total,
        };

        Ok(Box::new(MemoryScan {
            rows: page.into_iter(),
            next,
            closed: false,
        }))
    }

    async fn read_user(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }
}

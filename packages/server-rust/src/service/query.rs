//! Cursor-paginated movie queries and the user point lookup.
//!
//! Each operation validates its filter arguments before any storage access,
//! opens a bounded scan through the gateway, decodes rows into wire
//! records, and threads the opaque paging state back to the caller. The
//! scan is closed exactly once on every exit path, including mid-scan
//! errors, so storage-side resources are never leaked.
//!
//! Output ordering is whatever the storage engine's range scan yields for
//! the fixed filter -- nothing is re-sorted here.

use std::sync::Arc;

use uuid::Uuid;

use catalog_core::{
    ensure_positive_page_size, require_id, GetMoviesByCategoryRequest, GetUserRequest,
    ListMoviesByOwnerRequest, Movie, MovieList, MoviePage, SearchMoviesByNameRequest,
    UserResponse, ValidationError,
};

use crate::service::cancel::Cancellation;
use crate::service::error::ServiceError;
use crate::storage::{MovieRow, RowScan, ScanFilter, StorageGateway};

/// Decodes one storage row into its wire shape.
fn decode_row(row: MovieRow) -> Movie {
    Movie {
        id: row.id.to_string(),
        owner_id: row.owner_id.to_string(),
        category_id: row.category_id.to_string(),
        name: row.name,
        banner_ref: row.banner_ref,
        content_ref: row.content_ref,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Executes catalog read queries against the storage gateway.
///
/// Long-lived and shared by all invocations; every query owns its own scan
/// and page, nothing query-local is shared between callers.
pub struct QueryExecutor {
    gateway: Arc<dyn StorageGateway>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self { gateway }
    }

    /// All movies for one owner in one category, in a single call.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] -- malformed owner or category id
    /// - [`ServiceError::NotFound`] -- the filter matched zero rows; a
    ///   deliberate signal distinct from an exhausted page
    /// - [`ServiceError::Storage`] -- scan open, iteration, or close failed
    pub async fn movies_by_owner_and_category(
        &self,
        request: &GetMoviesByCategoryRequest,
        cancel: &Cancellation,
    ) -> Result<MovieList, ServiceError> {
        let owner = parse_filter_id("ownerId", &request.owner_id)?;
        let category = parse_filter_id("categoryId", &request.category_id)?;
        let filter = ScanFilter::OwnerAndCategory { owner, category };

        let (movies, _paging_state) = self.collect_page(&filter, None, None, cancel).await?;
        if movies.is_empty() {
            return Err(ServiceError::NotFound {
                what: format!("movies for owner {owner} in category {category}"),
            });
        }

        tracing::debug!(%owner, %category, count = movies.len(), "movies fetched by category");
        Ok(MovieList {
            movies,
            message: "Movies fetched successfully".to_string(),
        })
    }

    /// One page of all movies for one owner.
    ///
    /// Always succeeds with zero-or-more rows; `paging_state` is absent once
    /// the scan is exhausted.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] -- malformed owner id or zero page size
    /// - [`ServiceError::Storage`] -- scan open, iteration, or close failed
    pub async fn list_movies_by_owner(
        &self,
        request: &ListMoviesByOwnerRequest,
        cancel: &Cancellation,
    ) -> Result<MoviePage, ServiceError> {
        let owner = parse_filter_id("ownerId", &request.owner_id)?;
        ensure_positive_page_size(request.page_size)?;
        let filter = ScanFilter::Owner { owner };

        let (movies, paging_state) = self
            .collect_page(
                &filter,
                Some(request.page_size),
                request.paging_state.clone(),
                cancel,
            )
            .await?;

        tracing::debug!(%owner, count = movies.len(), "movie page fetched");
        Ok(MoviePage {
            movies,
            message: "Movies fetched successfully".to_string(),
            paging_state,
        })
    }

    /// One page of an owner's movies matching a name exactly.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`list_movies_by_owner`](Self::list_movies_by_owner),
    /// plus a validation failure for an empty name.
    pub async fn search_movies_by_owner_and_name(
        &self,
        request: &SearchMoviesByNameRequest,
        cancel: &Cancellation,
    ) -> Result<MoviePage, ServiceError> {
        let owner = parse_filter_id("ownerId", &request.owner_id)?;
        if request.name.is_empty() {
            return Err(ServiceError::Validation(ValidationError::MissingField {
                kind: "movie search",
                field: "name",
            }));
        }
        ensure_positive_page_size(request.page_size)?;
        let filter = ScanFilter::OwnerAndName {
            owner,
            name: request.name.clone(),
        };

        let (movies, paging_state) = self
            .collect_page(
                &filter,
                Some(request.page_size),
                request.paging_state.clone(),
                cancel,
            )
            .await?;

        Ok(MoviePage {
            movies,
            message: "Movies fetched successfully".to_string(),
            paging_state,
        })
    }

    /// Point lookup of one user by row key.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] -- malformed id
    /// - [`ServiceError::NotFound`] -- no row under that key
    /// - [`ServiceError::Storage`] -- the read failed
    pub async fn get_user(&self, request: &GetUserRequest) -> Result<UserResponse, ServiceError> {
        let id = parse_filter_id("id", &request.id)?;
        let row = self
            .gateway
            .read_user(id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or_else(|| ServiceError::NotFound {
                what: format!("user {id}"),
            })?;

        Ok(UserResponse {
            id: row.id.to_string(),
            name: row.name,
            alias_name: row.alias_name,
        })
    }

    /// Opens a scan, drains the page, and closes the scan exactly once.
    ///
    /// Returns the decoded rows plus the paging state for the next call
    /// (`None` when the engine signals exhaustion). A drain error wins over
    /// a close error; a close failure after a clean drain surfaces as its
    /// own storage failure.
    async fn collect_page(
        &self,
        filter: &ScanFilter,
        page_size: Option<u32>,
        resume_state: Option<Vec<u8>>,
        cancel: &Cancellation,
    ) -> Result<(Vec<Movie>, Option<Vec<u8>>), ServiceError> {
        let mut scan = self
            .gateway
            .scan(filter, page_size, resume_state)
            .await
            .map_err(ServiceError::Storage)?;

        let outcome = drain_page(scan.as_mut(), cancel).await;
        let close_result = scan.close().await;

        let movies = match outcome {
            Ok(movies) => movies,
            Err(err) => {
                if let Err(close_err) = close_result {
                    tracing::warn!(error = %close_err, "scan close failed after drain error");
                }
                return Err(err);
            }
        };
        close_result.map_err(ServiceError::Storage)?;

        let cursor = scan.paging_state();
        let paging_state = if cursor.finished {
            None
        } else {
            Some(cursor.state)
        };
        Ok((movies, paging_state))
    }
}

/// Drains every row of the current page, checking for cancellation between
/// rows. Does not close the scan -- the caller owns that.
async fn drain_page(
    scan: &mut dyn RowScan,
    cancel: &Cancellation,
) -> Result<Vec<Movie>, ServiceError> {
    let mut movies = Vec::new();
    loop {
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        match scan.next_row().await {
            Ok(Some(row)) => movies.push(decode_row(row)),
            Ok(None) => return Ok(movies),
            Err(err) => return Err(ServiceError::Storage(err)),
        }
    }
}

/// Parses a required textual UUID filter key.
fn parse_filter_id(field: &'static str, value: &str) -> Result<Uuid, ServiceError> {
    require_id("query", field, value).map_err(ServiceError::Validation)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::service::error::ErrorClass;
    use crate::storage::{MemoryGateway, Mutation, ScanCursor, UserRow};

    fn movie_mutation(owner: Uuid, category: Uuid, name: &str) -> Mutation {
        Mutation::InsertMovie(MovieRow {
            id: Uuid::now_v7(),
            owner_id: owner,
            category_id: category,
            name: name.to_string(),
            banner_ref: "banner".to_string(),
            content_ref: "content".to_string(),
            description: "desc".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        })
    }

    async fn seeded_executor(
        owner: Uuid,
        category: Uuid,
        count: usize,
    ) -> (QueryExecutor, Arc<MemoryGateway>) {
        let gateway = Arc::new(MemoryGateway::new());
        let mutations: Vec<Mutation> = (0..count)
            .map(|i| movie_mutation(owner, category, &format!("movie-{i}")))
            .collect();
        if !mutations.is_empty() {
            gateway.execute_batch(&mutations).await.unwrap();
        }
        let executor = QueryExecutor::new(Arc::clone(&gateway) as Arc<dyn StorageGateway>);
        (executor, gateway)
    }

    #[tokio::test]
    async fn by_category_returns_matching_rows() {
        let owner = Uuid::now_v7();
        let category = Uuid::now_v7();
        let (executor, _gateway) = seeded_executor(owner, category, 4).await;

        let request = GetMoviesByCategoryRequest {
            owner_id: owner.to_string(),
            category_id: category.to_string(),
        };
        let list = executor
            .movies_by_owner_and_category(&request, &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(list.movies.len(), 4);
        assert_eq!(list.message, "Movies fetched successfully");
        assert!(list.movies.iter().all(|m| m.owner_id == owner.to_string()));
    }

    #[tokio::test]
    async fn by_category_with_zero_rows_is_not_found() {
        let owner = Uuid::now_v7();
        let (executor, _gateway) = seeded_executor(owner, Uuid::now_v7(), 3).await;

        let request = GetMoviesByCategoryRequest {
            owner_id: owner.to_string(),
            // A category the owner has no movies in.
            category_id: Uuid::now_v7().to_string(),
        };
        let err = executor
            .movies_by_owner_and_category(&request, &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[tokio::test]
    async fn malformed_owner_id_fails_before_storage() {
        let (executor, gateway) = seeded_executor(Uuid::now_v7(), Uuid::now_v7(), 0).await;

        let request = GetMoviesByCategoryRequest {
            owner_id: "not-a-uuid".to_string(),
            category_id: Uuid::now_v7().to_string(),
        };
        let err = executor
            .movies_by_owner_and_category(&request, &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidArgument);
        assert_eq!(gateway.batches_executed(), 0);
    }

    #[tokio::test]
    async fn missing_owner_id_is_invalid_argument() {
        let (executor, _gateway) = seeded_executor(Uuid::now_v7(), Uuid::now_v7(), 0).await;

        let request = ListMoviesByOwnerRequest {
            owner_id: String::new(),
            page_size: 10,
            paging_state: None,
        };
        let err = executor
            .list_movies_by_owner(&request, &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }

    #[tokio::test]
    async fn zero_page_size_is_invalid_argument() {
        let owner = Uuid::now_v7();
        let (executor, _gateway) = seeded_executor(owner, Uuid::now_v7(), 3).await;

        let request = ListMoviesByOwnerRequest {
            owner_id: owner.to_string(),
            page_size: 0,
            paging_state: None,
        };
        let err = executor
            .list_movies_by_owner(&request, &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }

    #[tokio::test]
    async fn pagination_round_trip_covers_all_rows_exactly_once() {
        let owner = Uuid::now_v7();
        let category = Uuid::now_v7();
        // 2P + 1 rows for page size P: three pages, the last one short.
        let page_size = 3;
        let (executor, _gateway) = seeded_executor(owner, category, 7).await;

        let mut seen: Vec<String> = Vec::new();
        let mut paging_state: Option<Vec<u8>> = None;
        let mut pages = 0;
        loop {
            let request = ListMoviesByOwnerRequest {
                owner_id: owner.to_string(),
                page_size,
                paging_state: paging_state.take(),
            };
            let page = executor
                .list_movies_by_owner(&request, &Cancellation::none())
                .await
                .unwrap();
            pages += 1;
            seen.extend(page.movies.into_iter().map(|m| m.id));
            match page.paging_state {
                Some(state) => paging_state = Some(state),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen.len(), 7, "no gaps");
        let distinct: HashSet<&String> = seen.iter().collect();
        assert_eq!(distinct.len(), 7, "no duplicates");
    }

    #[tokio::test]
    async fn empty_page_is_success_not_not_found() {
        let owner = Uuid::now_v7();
        let (executor, _gateway) = seeded_executor(owner, Uuid::now_v7(), 0).await;

        let request = ListMoviesByOwnerRequest {
            owner_id: owner.to_string(),
            page_size: 5,
            paging_state: None,
        };
        let page = executor
            .list_movies_by_owner(&request, &Cancellation::none())
            .await
            .unwrap();

        assert!(page.movies.is_empty());
        assert!(page.paging_state.is_none());
    }

    #[tokio::test]
    async fn name_search_matches_exactly() {
        let owner = Uuid::now_v7();
        let category = Uuid::now_v7();
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .execute_batch(&[
                movie_mutation(owner, category, "Heat"),
                movie_mutation(owner, category, "Heat"),
                movie_mutation(owner, category, "Ronin"),
            ])
            .await
            .unwrap();
        let executor = QueryExecutor::new(Arc::clone(&gateway) as Arc<dyn StorageGateway>);

        let request = SearchMoviesByNameRequest {
            owner_id: owner.to_string(),
            name: "Heat".to_string(),
            page_size: 10,
            paging_state: None,
        };
        let page = executor
            .search_movies_by_owner_and_name(&request, &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(page.movies.len(), 2);
        assert!(page.movies.iter().all(|m| m.name == "Heat"));
    }

    #[tokio::test]
    async fn name_search_requires_a_name() {
        let owner = Uuid::now_v7();
        let (executor, _gateway) = seeded_executor(owner, Uuid::now_v7(), 1).await;

        let request = SearchMoviesByNameRequest {
            owner_id: owner.to_string(),
            name: String::new(),
            page_size: 10,
            paging_state: None,
        };
        let err = executor
            .search_movies_by_owner_and_name(&request, &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }

    #[tokio::test]
    async fn get_user_round_trip_and_miss() {
        let gateway = Arc::new(MemoryGateway::new());
        let id = Uuid::now_v7();
        gateway
            .execute_batch(&[Mutation::InsertUser {
                id,
                name: "Ada".to_string(),
                alias_name: "ada".to_string(),
            }])
            .await
            .unwrap();
        let executor = QueryExecutor::new(Arc::clone(&gateway) as Arc<dyn StorageGateway>);

        let found = executor
            .get_user(&GetUserRequest { id: id.to_string() })
            .await
            .unwrap();
        assert_eq!(found.name, "Ada");
        assert_eq!(found.id, id.to_string());

        let err = executor
            .get_user(&GetUserRequest {
                id: Uuid::now_v7().to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    // ---------------------------------------------------------------
    // Scan lifecycle doubles
    // ---------------------------------------------------------------

    /// Scripted scan that fails mid-iteration and counts close calls.
    struct ScriptedScan {
        rows_before_error: usize,
        fail_next: bool,
        fail_close: bool,
        closes: Arc<AtomicU32>,
    }

    #[async_trait]
    impl RowScan for ScriptedScan {
        async fn next_row(&mut self) -> anyhow::Result<Option<MovieRow>> {
            if self.rows_before_error > 0 {
                self.rows_before_error -= 1;
                return Ok(Some(MovieRow {
                    id: Uuid::now_v7(),
                    owner_id: Uuid::now_v7(),
                    category_id: Uuid::now_v7(),
                    name: "row".to_string(),
                    banner_ref: "b".to_string(),
                    content_ref: "c".to_string(),
                    description: "d".to_string(),
                    created_at: String::new(),
                    updated_at: String::new(),
                }));
            }
            if self.fail_next {
                anyhow::bail!("read timeout mid-scan");
            }
            Ok(None)
        }

        fn paging_state(&self) -> ScanCursor {
            ScanCursor {
                state: Vec::new(),
                finished: true,
            }
        }

        async fn close(&mut self) -> anyhow::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                anyhow::bail!("close failed");
            }
            Ok(())
        }
    }

    /// Gateway double handing out one scripted scan per call.
    struct ScriptedGateway {
        rows_before_error: usize,
        fail_next: bool,
        fail_close: bool,
        closes: Arc<AtomicU32>,
    }

    #[async_trait]
    impl StorageGateway for ScriptedGateway {
        async fn execute_batch(&self, _mutations: &[Mutation]) -> anyhow::Result<()> {
            anyhow::bail!("not used")
        }

        async fn scan(
            &self,
            _filter: &ScanFilter,
            _page_size: Option<u32>,
            _resume_state: Option<Vec<u8>>,
        ) -> anyhow::Result<Box<dyn RowScan>> {
            Ok(Box::new(ScriptedScan {
                rows_before_error: self.rows_before_error,
                fail_next: self.fail_next,
                fail_close: self.fail_close,
                closes: Arc::clone(&self.closes),
            }))
        }

        async fn read_user(&self, _id: Uuid) -> anyhow::Result<Option<UserRow>> {
            anyhow::bail!("not used")
        }
    }

    fn list_request(page_size: u32) -> ListMoviesByOwnerRequest {
        ListMoviesByOwnerRequest {
            owner_id: Uuid::now_v7().to_string(),
            page_size,
            paging_state: None,
        }
    }

    #[tokio::test]
    async fn scan_is_closed_exactly_once_on_success() {
        let closes = Arc::new(AtomicU32::new(0));
        let executor = QueryExecutor::new(Arc::new(ScriptedGateway {
            rows_before_error: 2,
            fail_next: false,
            fail_close: false,
            closes: Arc::clone(&closes),
        }));

        let page = executor
            .list_movies_by_owner(&list_request(10), &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(page.movies.len(), 2);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scan_is_closed_exactly_once_on_mid_scan_error() {
        let closes = Arc::new(AtomicU32::new(0));
        let executor = QueryExecutor::new(Arc::new(ScriptedGateway {
            rows_before_error: 1,
            fail_next: true,
            fail_close: false,
            closes: Arc::clone(&closes),
        }));

        let err = executor
            .list_movies_by_owner(&list_request(10), &Cancellation::none())
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_failure_surfaces_as_storage_error() {
        let closes = Arc::new(AtomicU32::new(0));
        let executor = QueryExecutor::new(Arc::new(ScriptedGateway {
            rows_before_error: 1,
            fail_next: false,
            fail_close: true,
            closes: Arc::clone(&closes),
        }));

        let err = executor
            .list_movies_by_owner(&list_request(10), &Cancellation::none())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_query_still_closes_the_scan() {
        let closes = Arc::new(AtomicU32::new(0));
        let executor = QueryExecutor::new(Arc::new(ScriptedGateway {
            rows_before_error: 5,
            fail_next: false,
            fail_close: false,
            closes: Arc::clone(&closes),
        }));
        let (handle, cancel) = Cancellation::pair();
        handle.cancel();

        let err = executor
            .list_movies_by_owner(&list_request(10), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Cancelled));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}

//! Request and response message types for the catalog service surface.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` to match the
//! client-facing wire shape. Paging state is opaque bytes: returned from one
//! page and echoed unchanged on the next call, never interpreted here.

use serde::{Deserialize, Serialize};

/// Terminal response of one streaming ingestion session.
///
/// Emitted exactly once, after the inbound stream ends and the tail batch
/// has been flushed. A failed session emits an error instead -- never a
/// partial summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    /// Human-readable status, e.g. "Users created successfully".
    pub message: String,
    /// Number of records accepted into some batch during the session.
    pub accepted: u64,
}

/// Point lookup of one user by row key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserRequest {
    /// Textual UUID of the user.
    pub id: String,
}

/// A single user row, decoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub alias_name: String,
}

/// Non-paginated movie lookup: all movies for one owner in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMoviesByCategoryRequest {
    /// Textual UUID of the owning user. Required.
    pub owner_id: String,
    /// Textual UUID of the category. Required.
    pub category_id: String,
}

/// Paginated listing of all movies for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesByOwnerRequest {
    /// Textual UUID of the owning user. Required.
    pub owner_id: String,
    /// Rows per page. Strictly positive.
    pub page_size: u32,
    /// Opaque resume token from the previous page. Omitted on the first call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_state: Option<Vec<u8>>,
}

/// Paginated lookup of one owner's movies by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMoviesByNameRequest {
    /// Textual UUID of the owning user. Required.
    pub owner_id: String,
    /// Exact movie name to match. Required.
    pub name: String,
    /// Rows per page. Strictly positive.
    pub page_size: u32,
    /// Opaque resume token from the previous page. Omitted on the first call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_state: Option<Vec<u8>>,
}

/// A single movie, decoded from a storage row for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub owner_id: String,
    pub category_id: String,
    pub name: String,
    pub banner_ref: String,
    pub content_ref: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response of the non-paginated movie lookup.
///
/// Zero matching rows is surfaced as a not-found error instead, so this
/// always carries at least one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub message: String,
}

/// One page of a paginated movie query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    /// Zero or more movies; an empty page is a successful result.
    pub movies: Vec<Movie>,
    pub message: String,
    /// Resume token for the next page, absent when the scan is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_state: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_wire_shape() {
        let summary = IngestionSummary {
            message: "Users created successfully".to_string(),
            accepted: 42,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["message"], "Users created successfully");
        assert_eq!(json["accepted"], 42);
    }

    #[test]
    fn exhausted_page_omits_paging_state() {
        let page = MoviePage {
            movies: Vec::new(),
            message: "Movies fetched successfully".to_string(),
            paging_state: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("pagingState").is_none());
    }

    #[test]
    fn paging_state_round_trips_opaquely() {
        let request = ListMoviesByOwnerRequest {
            owner_id: "owner".to_string(),
            page_size: 25,
            paging_state: Some(vec![9, 0, 0, 0, 0, 0, 0, 0]),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: ListMoviesByOwnerRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.paging_state, request.paging_state);
    }

    #[test]
    fn paging_state_defaults_to_absent() {
        let json = r#"{"ownerId":"o","name":"Heat","pageSize":10}"#;
        let request: SearchMoviesByNameRequest = serde_json::from_str(json).unwrap();
        assert!(request.paging_state.is_none());
    }
}

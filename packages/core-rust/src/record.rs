//! Client-streamed write record types.
//!
//! These are the wire shapes clients send on ingestion streams, one variant
//! per entity kind. All structs use `#[serde(rename_all = "camelCase")]` to
//! match the client-facing field names.
//!
//! Identifiers inside records (`owner_id`, `category_id`) are textual UUIDs;
//! they are checked during validation and parsed when the record is turned
//! into a storage mutation. Row keys are never part of a write record -- the
//! ingestion path mints them.

use serde::{Deserialize, Serialize};

/// A user to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Display name. Required, non-empty.
    pub name: String,
    /// Alias or handle. Required, non-empty.
    pub alias_name: String,
}

/// A category to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Category name. Required, non-empty.
    pub name: String,
    /// Free-form description. Required, non-empty.
    pub description: String,
}

/// A movie to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Textual UUID of the owning user. Required, must parse.
    pub owner_id: String,
    /// Textual UUID of the category. Required, must parse.
    pub category_id: String,
    /// Movie title. Required, non-empty.
    pub name: String,
    /// Reference to the banner asset. Required, non-empty.
    pub banner_ref: String,
    /// Reference to the content asset. Required, non-empty.
    pub content_ref: String,
    /// Free-form description. Required, non-empty.
    pub description: String,
    /// Client-supplied creation timestamp. Carried through as-is.
    pub created_at: String,
    /// Client-supplied update timestamp. Carried through as-is.
    pub updated_at: String,
}

/// Any write record variant, for call sites that handle all three entity
/// kinds uniformly (e.g. transport decoding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteRecord {
    User(UserRecord),
    Category(CategoryRecord),
    Movie(MovieRecord),
}

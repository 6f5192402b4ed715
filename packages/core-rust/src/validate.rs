//! Per-record structural validation.
//!
//! Pure checks with no I/O: every required field of a write record must be a
//! non-empty string, and embedded identifiers must be well-formed UUIDs.
//! Validation runs before identity generation, so a rejected record never
//! consumes a row key and never counts as accepted.

use uuid::Uuid;

use crate::record::{CategoryRecord, MovieRecord, UserRecord, WriteRecord};

/// A structural defect in a single write record or query argument.
///
/// Always a caller error (invalid-argument class); never retried.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind}: {field} is required")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("{kind}: {field} is not a valid identifier: {source}")]
    InvalidIdentifier {
        kind: &'static str,
        field: &'static str,
        source: uuid::Error,
    },
    #[error("pageSize must be strictly positive")]
    NonPositivePageSize,
}

/// Structural validation of one record, prior to accepting it into a batch.
pub trait Validate {
    /// Returns `Ok(())` when every required field is present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, field order matching the
    /// record's wire shape.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Rejects an empty required field.
fn require(kind: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField { kind, field });
    }
    Ok(())
}

/// Parses a required textual UUID field.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for an empty value and
/// [`ValidationError::InvalidIdentifier`] when parsing fails, so malformed
/// identifiers are rejected before any id is minted or storage touched.
pub fn require_id(
    kind: &'static str,
    field: &'static str,
    value: &str,
) -> Result<Uuid, ValidationError> {
    require(kind, field, value)?;
    Uuid::parse_str(value).map_err(|source| ValidationError::InvalidIdentifier {
        kind,
        field,
        source,
    })
}

/// Rejects a zero page size. Paginated queries require a strictly positive
/// page size before any storage access.
pub fn ensure_positive_page_size(page_size: u32) -> Result<(), ValidationError> {
    if page_size == 0 {
        return Err(ValidationError::NonPositivePageSize);
    }
    Ok(())
}

impl Validate for UserRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require("user", "name", &self.name)?;
        require("user", "aliasName", &self.alias_name)
    }
}

impl Validate for CategoryRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require("category", "name", &self.name)?;
        require("category", "description", &self.description)
    }
}

impl Validate for MovieRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id("movie", "ownerId", &self.owner_id)?;
        require_id("movie", "categoryId", &self.category_id)?;
        require("movie", "name", &self.name)?;
        require("movie", "bannerRef", &self.banner_ref)?;
        require("movie", "contentRef", &self.content_ref)?;
        require("movie", "description", &self.description)
    }
}

impl Validate for WriteRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::User(record) => record.validate(),
            Self::Category(record) => record.validate(),
            Self::Movie(record) => record.validate(),
        }
    }
}

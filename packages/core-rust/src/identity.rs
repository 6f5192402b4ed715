//! Time-ordered row key generation for the ingestion path.
//!
//! Row keys are minted server-side at the moment a record is accepted into a
//! batch -- never supplied by the caller, generated exactly once per accepted
//! record, and never reused even if the record later fails to persist.

use uuid::Uuid;

/// Mints unique, time-ordered row keys.
///
/// Behind a trait so tests can substitute a deterministic generator.
/// Shared across sessions as `Arc<dyn IdentityGenerator>`.
pub trait IdentityGenerator: Send + Sync {
    /// Returns a fresh identifier whose sort order approximates creation order.
    fn new_time_ordered_id(&self) -> Uuid;
}

/// Default generator producing UUIDv7 values.
///
/// UUIDv7 embeds a millisecond timestamp in the most significant bits, so
/// lexicographic order approximates creation order -- suitable as a
/// wide-column row key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedIds;

impl IdentityGenerator for TimeOrderedIds {
    fn new_time_ordered_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn generated_ids_are_version_7() {
        let ids = TimeOrderedIds;
        assert_eq!(ids.new_time_ordered_id().get_version_num(), 7);
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids = TimeOrderedIds;
        let minted: HashSet<Uuid> = (0..1000).map(|_| ids.new_time_ordered_id()).collect();
        assert_eq!(minted.len(), 1000);
    }

    #[test]
    fn ids_minted_later_sort_later() {
        let ids = TimeOrderedIds;
        let first = ids.new_time_ordered_id();
        // UUIDv7 timestamps have millisecond precision.
        thread::sleep(Duration::from_millis(2));
        let second = ids.new_time_ordered_id();
        assert!(first < second);
    }
}

//! Logical deletion shared by users, groups, ideas, votes and projects.
//!
//! Soft-deleted rows stay in the store for audit purposes. Read paths filter
//! them out centrally: the Diesel adapters through one `active()` filter per
//! table and in-memory adapters through [`active`].

use chrono::{DateTime, Utc};

/// Deletion marker stored alongside an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deletion {
    deleted_at: Option<DateTime<Utc>>,
}

impl Deletion {
    /// Marker for a live entity.
    #[must_use]
    pub const fn live() -> Self {
        Self { deleted_at: None }
    }

    /// Rebuild the marker from the stored flag and timestamp.
    ///
    /// A set flag without a timestamp is still treated as deleted, using the
    /// Unix epoch as the deletion time.
    #[must_use]
    pub fn from_parts(is_deleted: bool, deleted_at: Option<DateTime<Utc>>) -> Self {
        match (is_deleted, deleted_at) {
            (false, _) => Self::live(),
            (true, Some(at)) => Self {
                deleted_at: Some(at),
            },
            (true, None) => Self {
                deleted_at: Some(DateTime::<Utc>::UNIX_EPOCH),
            },
        }
    }

    /// Whether the entity has been logically removed.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Time of removal, if removed.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Capability of entities that support logical deletion.
pub trait SoftDeletable {
    /// Current deletion marker.
    fn deletion(&self) -> &Deletion;

    /// Mutable deletion marker.
    fn deletion_mut(&mut self) -> &mut Deletion;

    /// Whether the entity has been logically removed.
    fn is_deleted(&self) -> bool {
        self.deletion().is_deleted()
    }

    /// Time of removal, if removed.
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deletion().deleted_at()
    }

    /// Mark the entity as removed at `at`. Already removed entities keep
    /// their original timestamp.
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        let marker = self.deletion_mut();
        if marker.deleted_at.is_none() {
            marker.deleted_at = Some(at);
        }
    }

    /// Clear the deletion marker.
    fn restore(&mut self) {
        self.deletion_mut().deleted_at = None;
    }
}

/// Iterate over the entities that have not been removed.
pub fn active<'a, T, I>(items: I) -> impl Iterator<Item = &'a T>
where
    T: SoftDeletable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().filter(|item| !item.is_deleted())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row(Deletion);

    impl SoftDeletable for Row {
        fn deletion(&self) -> &Deletion {
            &self.0
        }

        fn deletion_mut(&mut self) -> &mut Deletion {
            &mut self.0
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn mark_keeps_first_timestamp() {
        let mut row = Row(Deletion::live());
        row.mark_deleted(at(1));
        row.mark_deleted(at(2));
        assert_eq!(row.deleted_at(), Some(at(1)));
    }

    #[test]
    fn restore_clears_marker() {
        let mut row = Row(Deletion::from_parts(true, Some(at(3))));
        row.restore();
        assert!(!row.is_deleted());
    }

    #[test]
    fn flag_without_timestamp_is_deleted() {
        assert!(Deletion::from_parts(true, None).is_deleted());
        assert!(!Deletion::from_parts(false, Some(at(4))).is_deleted());
    }

    #[test]
    fn active_skips_removed_rows() {
        let rows = [
            Row(Deletion::live()),
            Row(Deletion::from_parts(true, Some(at(5)))),
        ];
        assert_eq!(active(&rows).count(), 1);
    }
}

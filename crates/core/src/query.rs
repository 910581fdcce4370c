//! Read filters shared by every backend.

use crate::Time;

/// Sort direction by record timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

/// Filter for listing a user's records.
///
/// `completed_only` applies to sessions; `since` is compared with each
/// record's own timestamp (session start, distraction time, badge award).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Only completed sessions
    pub completed_only: bool,

    /// Only records at or after this time
    pub since: Option<Time>,

    /// Maximum number of records
    pub limit: Option<usize>,

    /// Sort direction
    pub order: SortOrder,
}

impl RecordQuery {
    /// Everything, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only completed sessions.
    pub fn completed(mut self) -> Self {
        self.completed_only = true;
        self
    }

    /// Only records at or after `since`.
    pub fn since(mut self, since: Time) -> Self {
        self.since = Some(since);
        self
    }

    /// At most `limit` records.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Oldest first.
    pub fn ascending(mut self) -> Self {
        self.order = SortOrder::Ascending;
        self
    }

    /// Whether a timestamp passes the `since` bound.
    pub fn admits(&self, at: Option<Time>) -> bool {
        match (self.since, at) {
            (Some(since), Some(at)) => at >= since,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Sort by `key` and apply the limit. Used by local backends after
    /// filtering.
    pub fn finish<T, F>(&self, mut items: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> Option<Time>,
    {
        items.sort_by(|a, b| key(a).cmp(&key(b)));
        if self.order == SortOrder::Descending {
            items.reverse();
        }
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        items
    }
}

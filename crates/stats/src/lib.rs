//! Statistics derived from persisted focus records.
//!
//! Pure aggregation (summary cards, progress goals, weekly buckets, history
//! lines) plus a [`StatsService`] that fetches a user's rows and builds the
//! dashboard, calendar and distraction-log views.

pub mod history;
pub mod service;
pub mod summary;
pub mod weekly;

pub use history::{
    time_ago, DistractionLine, DistractionLog, SessionLine, DISTRACTION_LOG_LIMIT,
    SESSION_HISTORY_LIMIT,
};
pub use service::StatsService;
pub use summary::{
    DashboardStats, GoalProgress, ProgressGoals, SessionTotals, DISTRACTION_PENALTY,
    MINUTES_TARGET, SESSION_TARGET,
};
pub use weekly::{
    bucket_index, start_of_week, weekday_bucket, WeeklyBuckets, DAY_INITIALS, DAY_LABELS,
};

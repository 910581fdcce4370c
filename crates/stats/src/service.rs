//! Stats service over a backend.
//!
//! Fetches a user's records and derives the dashboard, calendar and
//! distraction-log views. Nothing is cached; every call re-reads.

use chrono::{DateTime, Local, TimeZone};
use focusforge_core::{AuthUser, RecordQuery};
use focusforge_storage::{Backend, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::history::{DistractionLog, DISTRACTION_LOG_LIMIT, SESSION_HISTORY_LIMIT};
use crate::summary::DashboardStats;
use crate::weekly::{start_of_week, WeeklyBuckets};

/// Read-only aggregation service.
pub struct StatsService {
    backend: Arc<dyn Backend>,
}

impl StatsService {
    /// Create a new stats service.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Dashboard for the current local week.
    pub async fn dashboard(&self, user: &AuthUser) -> Result<DashboardStats> {
        self.dashboard_at(user, &Local::now()).await
    }

    /// Dashboard with week boundaries taken from `now`'s time zone.
    pub async fn dashboard_at<Tz>(&self, user: &AuthUser, now: &DateTime<Tz>) -> Result<DashboardStats>
    where
        Tz: TimeZone,
    {
        let profile = self.backend.load_profile(user).await?;
        let sessions = self.backend.list_sessions(user, &RecordQuery::all()).await?;
        let badges = self.backend.list_badges(user, &RecordQuery::all()).await?;
        debug!(user = %user.id, sessions = sessions.len(), badges = badges.len(), "dashboard fetched");

        let weekly = WeeklyBuckets::from_sessions(&sessions, start_of_week(now), &now.timezone());
        Ok(DashboardStats::from_records(&sessions, profile.as_ref(), badges, weekly))
    }

    /// Completed sessions per weekday for the current local week.
    pub async fn calendar(&self, user: &AuthUser) -> Result<WeeklyBuckets> {
        self.calendar_at(user, &Local::now()).await
    }

    /// Weekly buckets for the week containing `now`.
    pub async fn calendar_at<Tz>(&self, user: &AuthUser, now: &DateTime<Tz>) -> Result<WeeklyBuckets>
    where
        Tz: TimeZone,
    {
        let week_start = start_of_week(now);
        let query = RecordQuery::all().completed().since(week_start).ascending();
        let sessions = self.backend.list_sessions(user, &query).await?;
        Ok(WeeklyBuckets::from_sessions(&sessions, week_start, &now.timezone()))
    }

    /// Recent sessions and distractions in the local time zone.
    pub async fn distraction_log(&self, user: &AuthUser) -> Result<DistractionLog> {
        self.distraction_log_in(user, &Local).await
    }

    /// Recent sessions and distractions, timestamps rendered in `tz`.
    pub async fn distraction_log_in<Tz>(&self, user: &AuthUser, tz: &Tz) -> Result<DistractionLog>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let distractions = self
            .backend
            .list_distractions(user, &RecordQuery::all().limit(DISTRACTION_LOG_LIMIT))
            .await?;
        let sessions = self
            .backend
            .list_sessions(user, &RecordQuery::all().limit(SESSION_HISTORY_LIMIT))
            .await?;
        Ok(DistractionLog::from_records(&sessions, &distractions, tz))
    }
}

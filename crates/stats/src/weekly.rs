//! Day-of-week bucketing with a Monday-start week.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use focusforge_core::Session;
use serde::Serialize;

/// Short day names, Monday first.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Single-letter day names, Monday first.
pub const DAY_INITIALS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

/// Map a Sunday-based weekday number (Sunday = 0) to a Monday-based
/// bucket (Monday = 0, Sunday = 6).
pub fn bucket_index(sunday_based: u32) -> usize {
    (sunday_based as usize + 6) % 7
}

/// Bucket for a chrono weekday.
pub fn weekday_bucket(day: Weekday) -> usize {
    bucket_index(day.num_days_from_sunday())
}

/// Monday 00:00 of the week containing `now`, in `now`'s time zone.
pub fn start_of_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let monday = today - Days::new(u64::from(now.weekday().num_days_from_monday()));
    let midnight = monday.and_time(NaiveTime::MIN);

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        // Midnight skipped by a DST jump; fall back to UTC midnight
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Completed sessions per weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyBuckets {
    /// Counts, Monday first
    pub counts: [u32; 7],
}

impl WeeklyBuckets {
    /// Count completed sessions started at or after `week_start`, bucketed
    /// by their weekday in `tz`.
    pub fn from_sessions<Tz: TimeZone>(sessions: &[Session], week_start: DateTime<Utc>, tz: &Tz) -> Self {
        let mut counts = [0u32; 7];
        for session in sessions {
            if !session.completed || session.started_at < week_start {
                continue;
            }
            let local = session.started_at.with_timezone(tz);
            counts[weekday_bucket(local.weekday())] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Busiest day count, for chart scaling.
    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(label, count)` pairs, Monday first.
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        DAY_LABELS.iter().copied().zip(self.counts.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use focusforge_core::{NewSession, SessionId, UserId};

    fn session(started_at: DateTime<Utc>, completed: bool) -> Session {
        let mut new = NewSession::new(UserId::new("u1"), "Work", 25);
        new.started_at = started_at;
        let mut s = Session::from_new(SessionId::generate(), new);
        s.completed = completed;
        s
    }

    #[test]
    fn test_sunday_maps_to_last_bucket() {
        assert_eq!(bucket_index(0), 6);
        assert_eq!(bucket_index(1), 0);
        assert_eq!(bucket_index(6), 5);
        assert_eq!(weekday_bucket(Weekday::Sun), 6);
        assert_eq!(weekday_bucket(Weekday::Mon), 0);
    }

    #[test]
    fn test_start_of_week() {
        // Wednesday 2025-03-05 15:30 UTC
        let now = Utc.with_ymd_and_hms(2025, 3, 5, 15, 30, 0).unwrap();
        assert_eq!(start_of_week(&now), Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());

        // Sunday belongs to the week that started six days earlier
        let sunday = Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap();
        assert_eq!(start_of_week(&sunday), Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());

        // Local midnight in UTC+2 is 22:00 UTC the day before
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = now.with_timezone(&tz);
        assert_eq!(start_of_week(&local_now), Utc.with_ymd_and_hms(2025, 3, 2, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_buckets_only_count_completed_this_week() {
        let week_start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let sessions = vec![
            session(Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(), true),
            session(Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap(), true),
            session(Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(), false),
            session(Utc.with_ymd_and_hms(2025, 3, 9, 20, 0, 0).unwrap(), true),
            // Previous week
            session(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap(), true),
        ];

        let buckets = WeeklyBuckets::from_sessions(&sessions, week_start, &Utc);
        assert_eq!(buckets.counts, [2, 0, 0, 0, 0, 0, 1]);
        assert_eq!(buckets.total(), 3);
        assert_eq!(buckets.max(), 2);
        assert_eq!(buckets.labeled().last(), Some(("Sun", 1)));
    }

    #[test]
    fn test_buckets_follow_time_zone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let week_start = Utc.with_ymd_and_hms(2025, 3, 3, 5, 0, 0).unwrap();
        // 02:00 UTC Tuesday is still Monday evening at UTC-5
        let sessions = vec![session(Utc.with_ymd_and_hms(2025, 3, 4, 2, 0, 0).unwrap(), true)];

        let buckets = WeeklyBuckets::from_sessions(&sessions, week_start, &tz);
        assert_eq!(buckets.counts[0], 1);
    }
}

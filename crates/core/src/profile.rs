//! User profile: cumulative XP and streak.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use crate::id::UserId;
use crate::nullable::null_default;
use crate::Time;

/// Per-user gamification totals (`profiles` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user
    pub id: UserId,

    /// Cumulative XP
    #[serde(default, deserialize_with = "null_default")]
    pub xp: u32,

    /// Consecutive days with a completed session
    #[serde(default, deserialize_with = "null_default")]
    pub streak_count: u32,

    /// When the last session completed
    #[serde(default)]
    pub last_session_date: Option<Time>,
}

impl Profile {
    /// Profile with zeroed totals, used when the backend has none.
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            xp: 0,
            streak_count: 0,
            last_session_date: None,
        }
    }

    /// Totals after completing a session worth `xp_earned` at `now`.
    ///
    /// Calendar days are taken in `now`'s time zone.
    pub fn after_completion<Tz: TimeZone>(&self, xp_earned: u32, now: &DateTime<Tz>) -> ProfileUpdate {
        let today = now.date_naive();
        let last = self
            .last_session_date
            .map(|at| at.with_timezone(&now.timezone()).date_naive());

        ProfileUpdate {
            xp: self.xp.saturating_add(xp_earned),
            streak_count: next_streak(self.streak_count, last, today),
            last_session_date: now.with_timezone(&Utc),
        }
    }

    /// Apply an update the way the backend would.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.xp = update.xp;
        self.streak_count = update.streak_count;
        self.last_session_date = Some(update.last_session_date);
    }
}

/// Profile columns written on session completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New cumulative XP
    pub xp: u32,

    /// New streak
    pub streak_count: u32,

    /// Completion time of the session just finished
    pub last_session_date: Time,
}

/// Streak after a session completed on `today`.
///
/// Continues only when the previous session was exactly yesterday;
/// anything else (including no previous session) starts over at 1.
pub fn next_streak(current: u32, last_session: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match (last_session, today.pred_opt()) {
        (Some(last), Some(yesterday)) if last == yesterday => current.saturating_add(1),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_null_totals_read_as_zero() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "xp": null,
            "streak_count": null,
            "last_session_date": null
        }))
        .unwrap();
        assert_eq!(profile, Profile::empty(UserId::new("u1")));
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        assert_eq!(next_streak(4, Some(date(2025, 3, 9)), date(2025, 3, 10)), 5);
        assert_eq!(next_streak(0, Some(date(2024, 12, 31)), date(2025, 1, 1)), 1);
    }

    #[test]
    fn test_streak_resets_otherwise() {
        let today = date(2025, 3, 10);
        assert_eq!(next_streak(4, None, today), 1);
        assert_eq!(next_streak(4, Some(date(2025, 3, 8)), today), 1);
        // Same day counts as "not yesterday"
        assert_eq!(next_streak(4, Some(today), today), 1);
        assert_eq!(next_streak(4, Some(date(2025, 3, 11)), today), 1);
    }

    #[test]
    fn test_after_completion_uses_local_calendar_day() {
        // 23:30 at UTC+2 on the 9th is 21:30 UTC the same day
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let last = tz.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();
        let profile = Profile {
            id: UserId::new("u1"),
            xp: 100,
            streak_count: 2,
            last_session_date: Some(last.with_timezone(&Utc)),
        };

        let now = tz.with_ymd_and_hms(2025, 3, 10, 0, 15, 0).unwrap();
        let update = profile.after_completion(35, &now);
        assert_eq!(update.xp, 135);
        assert_eq!(update.streak_count, 3);
        assert_eq!(update.last_session_date, now.with_timezone(&Utc));
    }

    #[test]
    fn test_after_completion_on_empty_profile() {
        let profile = Profile::empty(UserId::new("u1"));
        let now = Utc::now();
        let update = profile.after_completion(50, &now);
        assert_eq!(update.xp, 50);
        assert_eq!(update.streak_count, 1);

        let mut profile = profile;
        profile.apply(&update);
        let later = now + Duration::days(1);
        assert_eq!(profile.after_completion(10, &later).streak_count, 2);
    }
}

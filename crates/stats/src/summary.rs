//! Dashboard summary cards and progress goals.

use focusforge_core::{Badge, Profile, Session};
use serde::Serialize;

use crate::weekly::WeeklyBuckets;

/// Completed sessions needed to fill the sessions goal.
pub const SESSION_TARGET: u32 = 10;

/// Focus minutes needed to fill the time goal.
pub const MINUTES_TARGET: u32 = 300;

/// Distraction-control points lost per distraction.
pub const DISTRACTION_PENALTY: u32 = 10;

/// Totals over every session row of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionTotals {
    /// All sessions, completed or not
    pub total_sessions: u32,
    /// Completed sessions
    pub completed_sessions: u32,
    /// Planned minutes of completed sessions
    pub focus_minutes: u32,
    /// Distraction counts summed over all sessions
    pub distractions: u32,
}

impl SessionTotals {
    /// Aggregate a user's sessions.
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let mut totals = Self::default();
        for session in sessions {
            totals.total_sessions += 1;
            totals.distractions = totals.distractions.saturating_add(session.distractions_count);
            if session.completed {
                totals.completed_sessions += 1;
                totals.focus_minutes = totals.focus_minutes.saturating_add(session.duration);
            }
        }
        totals
    }

    /// Focus time as `(hours, minutes)`.
    pub fn focus_time(&self) -> (u32, u32) {
        (self.focus_minutes / 60, self.focus_minutes % 60)
    }
}

/// Progress toward one fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    /// Achieved so far
    pub current: u32,
    /// Fixed target
    pub target: u32,
    /// `current / target`, unclamped
    pub ratio: f64,
}

impl GoalProgress {
    /// Progress of `current` toward `target`; a zero target reads as 0.
    pub fn new(current: u32, target: u32) -> Self {
        let ratio = if target == 0 {
            0.0
        } else {
            current as f64 / target as f64
        };
        Self {
            current,
            target,
            ratio,
        }
    }

    /// Ratio as a percentage clamped to 0..=100.
    pub fn percent(&self) -> f64 {
        (self.ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// The three progress bars on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressGoals {
    /// Completed sessions toward 10
    pub sessions: GoalProgress,
    /// Focus minutes toward 300
    pub minutes: GoalProgress,
    /// 100 with no distractions, minus 10 per distraction, floored at 0
    pub distraction_control: u32,
}

impl ProgressGoals {
    /// Goals derived from aggregated totals.
    pub fn from_totals(totals: &SessionTotals) -> Self {
        let distraction_control = if totals.distractions == 0 {
            100
        } else {
            100u32.saturating_sub(totals.distractions.saturating_mul(DISTRACTION_PENALTY))
        };
        Self {
            sessions: GoalProgress::new(totals.completed_sessions, SESSION_TARGET),
            minutes: GoalProgress::new(totals.focus_minutes, MINUTES_TARGET),
            distraction_control,
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Session aggregates
    pub totals: SessionTotals,
    /// Current streak; 0 without a profile
    pub streak: u32,
    /// Cumulative XP; 0 without a profile
    pub xp: u32,
    /// Progress bars
    pub goals: ProgressGoals,
    /// Completed sessions this week
    pub weekly: WeeklyBuckets,
    /// Earned badges
    pub badges: Vec<Badge>,
}

impl DashboardStats {
    /// Derive the dashboard from fetched records.
    pub fn from_records(
        sessions: &[Session],
        profile: Option<&Profile>,
        badges: Vec<Badge>,
        weekly: WeeklyBuckets,
    ) -> Self {
        let totals = SessionTotals::from_sessions(sessions);
        Self {
            goals: ProgressGoals::from_totals(&totals),
            totals,
            streak: profile.map(|p| p.streak_count).unwrap_or(0),
            xp: profile.map(|p| p.xp).unwrap_or(0),
            weekly,
            badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusforge_core::{NewSession, SessionId, UserId};

    fn session(duration: u32, completed: bool, distractions: u32) -> Session {
        let mut s = Session::from_new(
            SessionId::generate(),
            NewSession::new(UserId::new("u1"), "Task", duration),
        );
        s.completed = completed;
        s.distractions_count = distractions;
        s
    }

    #[test]
    fn test_empty_totals() {
        let totals = SessionTotals::from_sessions(&[]);
        assert_eq!(totals, SessionTotals::default());

        let goals = ProgressGoals::from_totals(&totals);
        assert_eq!(goals.distraction_control, 100);
        assert_eq!(goals.sessions.percent(), 0.0);
    }

    #[test]
    fn test_totals_count_focus_time_for_completed_only() {
        let sessions = vec![
            session(25, true, 0),
            session(45, true, 2),
            session(30, false, 3),
        ];
        let totals = SessionTotals::from_sessions(&sessions);

        assert_eq!(totals.total_sessions, 3);
        assert_eq!(totals.completed_sessions, 2);
        assert_eq!(totals.focus_minutes, 70);
        assert_eq!(totals.distractions, 5);
        assert_eq!(totals.focus_time(), (1, 10));
    }

    #[test]
    fn test_progress_goals() {
        let totals = SessionTotals {
            total_sessions: 14,
            completed_sessions: 12,
            focus_minutes: 150,
            distractions: 4,
        };
        let goals = ProgressGoals::from_totals(&totals);

        assert_eq!(goals.sessions.ratio, 1.2);
        assert_eq!(goals.sessions.percent(), 100.0);
        assert_eq!(goals.minutes.percent(), 50.0);
        assert_eq!(goals.distraction_control, 60);

        let noisy = SessionTotals {
            distractions: 25,
            ..totals
        };
        assert_eq!(ProgressGoals::from_totals(&noisy).distraction_control, 0);
    }

    #[test]
    fn test_dashboard_without_profile() {
        let stats = DashboardStats::from_records(
            &[session(25, true, 1)],
            None,
            Vec::new(),
            WeeklyBuckets::default(),
        );
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.xp, 0);
        assert_eq!(stats.totals.completed_sessions, 1);
        assert_eq!(stats.goals.distraction_control, 90);
    }
}

//! Focus session record and XP scoring.

use serde::{Deserialize, Serialize};
use crate::id::{SessionId, UserId};
use crate::nullable::null_default;
use crate::Time;

/// XP awarded for a session with no distractions.
pub const XP_BASE: u32 = 50;

/// XP deducted per logged distraction.
pub const XP_PENALTY_PER_DISTRACTION: u32 = 5;

/// Minimum XP for any completed session.
pub const XP_FLOOR: u32 = 10;

/// XP earned by a completed session: `max(10, 50 - 5 * distractions)`.
pub fn xp_for_distractions(distractions: u32) -> u32 {
    XP_BASE
        .saturating_sub(distractions.saturating_mul(XP_PENALTY_PER_DISTRACTION))
        .max(XP_FLOOR)
}

/// One timed focus attempt (`focus_sessions` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Owning user
    pub user_id: UserId,

    /// What the user wants to get done
    #[serde(default, deserialize_with = "null_default")]
    pub goal: String,

    /// Planned duration in minutes
    pub duration: u32,

    /// When the session started
    pub started_at: Time,

    /// Whether the timer ran to zero
    #[serde(default, deserialize_with = "null_default")]
    pub completed: bool,

    /// When the session completed
    #[serde(default)]
    pub completed_at: Option<Time>,

    /// Distractions logged against this session
    #[serde(default, deserialize_with = "null_default")]
    pub distractions_count: u32,

    /// XP awarded on completion
    #[serde(default, deserialize_with = "null_default")]
    pub xp_earned: u32,
}

impl Session {
    /// Materialize a freshly inserted session.
    pub fn from_new(id: SessionId, new: NewSession) -> Self {
        Self {
            id,
            user_id: new.user_id,
            goal: new.goal,
            duration: new.duration,
            started_at: new.started_at,
            completed: false,
            completed_at: None,
            distractions_count: 0,
            xp_earned: 0,
        }
    }

    /// Goal text for display.
    pub fn display_goal(&self) -> &str {
        if self.goal.trim().is_empty() {
            "Untitled Session"
        } else {
            &self.goal
        }
    }

    /// Apply an update the way the backend would.
    pub fn apply(&mut self, update: &SessionUpdate) {
        match update {
            SessionUpdate::Completion {
                completed,
                completed_at,
                xp_earned,
                distractions_count,
            } => {
                self.completed = *completed;
                self.completed_at = Some(*completed_at);
                self.xp_earned = *xp_earned;
                self.distractions_count = *distractions_count;
            }
            SessionUpdate::Distractions { distractions_count } => {
                self.distractions_count = *distractions_count;
            }
        }
    }
}

/// Insert payload for a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    /// Owning user
    pub user_id: UserId,

    /// Planned duration in minutes
    pub duration: u32,

    /// Session goal
    pub goal: String,

    /// Start time
    pub started_at: Time,
}

impl NewSession {
    /// Create an insert payload starting now.
    pub fn new(user_id: UserId, goal: impl Into<String>, duration: u32) -> Self {
        Self {
            user_id,
            duration,
            goal: goal.into(),
            started_at: chrono::Utc::now(),
        }
    }
}

/// Partial update of a session row.
///
/// Serializes to exactly the columns being patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionUpdate {
    /// Session ran to zero
    Completion {
        /// Always `true`
        completed: bool,
        /// Completion time
        completed_at: Time,
        /// Final XP
        xp_earned: u32,
        /// Final distraction tally
        distractions_count: u32,
    },

    /// Running distraction tally
    Distractions {
        /// Current tally
        distractions_count: u32,
    },
}

impl SessionUpdate {
    /// Completion update.
    pub fn completed(completed_at: Time, xp_earned: u32, distractions_count: u32) -> Self {
        SessionUpdate::Completion {
            completed: true,
            completed_at,
            xp_earned,
            distractions_count,
        }
    }

    /// Distraction tally update.
    pub fn distractions(distractions_count: u32) -> Self {
        SessionUpdate::Distractions { distractions_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_columns_read_as_defaults() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "user_id": "u1",
            "goal": null,
            "duration": 25,
            "started_at": "2025-03-03T09:00:00Z",
            "completed": null,
            "completed_at": null,
            "distractions_count": null,
            "xp_earned": null
        }))
        .unwrap();
        assert_eq!(session.goal, "");
        assert!(!session.completed);
        assert_eq!(session.distractions_count, 0);
        assert_eq!(session.xp_earned, 0);
        assert_eq!(session.display_goal(), "Untitled Session");
    }

    #[test]
    fn test_xp_formula() {
        assert_eq!(xp_for_distractions(0), 50);
        assert_eq!(xp_for_distractions(1), 45);
        assert_eq!(xp_for_distractions(3), 35);
        assert_eq!(xp_for_distractions(8), 10);
        assert_eq!(xp_for_distractions(10), 10);
        assert_eq!(xp_for_distractions(u32::MAX), 10);
    }

    #[test]
    fn test_xp_never_below_floor() {
        for d in 0..100 {
            let xp = xp_for_distractions(d);
            assert!(xp >= XP_FLOOR);
            assert!(xp <= XP_BASE);
        }
    }

    #[test]
    fn test_update_serializes_only_patched_columns() {
        let json = serde_json::to_value(SessionUpdate::distractions(2)).unwrap();
        assert_eq!(json, serde_json::json!({"distractions_count": 2}));

        let at = chrono::Utc::now();
        let json = serde_json::to_value(SessionUpdate::completed(at, 40, 2)).unwrap();
        assert_eq!(json["completed"], true);
        assert_eq!(json["xp_earned"], 40);
        assert_eq!(json["distractions_count"], 2);
        assert!(json.get("completed_at").is_some());
    }

    #[test]
    fn test_row_with_missing_counters_uses_defaults() {
        let row = serde_json::json!({
            "id": "s1",
            "user_id": "u1",
            "goal": "Write outline",
            "duration": 25,
            "started_at": "2025-03-03T09:00:00Z",
            "completed_at": null,
        });
        let session: Session = serde_json::from_value(row).unwrap();
        assert!(!session.completed);
        assert_eq!(session.distractions_count, 0);
        assert_eq!(session.xp_earned, 0);
        assert_eq!(session.completed_at, None);
    }

    #[test]
    fn test_apply_completion() {
        let mut session = Session::from_new(
            SessionId::new("s1"),
            NewSession::new(UserId::new("u1"), "", 25),
        );
        assert_eq!(session.display_goal(), "Untitled Session");

        let at = chrono::Utc::now();
        session.apply(&SessionUpdate::completed(at, 35, 3));
        assert!(session.completed);
        assert_eq!(session.completed_at, Some(at));
        assert_eq!(session.xp_earned, 35);
        assert_eq!(session.distractions_count, 3);
    }
}

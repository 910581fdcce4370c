//! Achievement badges and the milestones that award them.

use serde::{Deserialize, Serialize};
use crate::id::{BadgeId, UserId};
use crate::nullable::null_default;
use crate::Time;

/// An earned achievement (`badges` row). Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    /// Unique identifier
    pub id: BadgeId,

    /// Owning user
    pub user_id: UserId,

    /// Badge title
    pub name: String,

    /// What it was awarded for
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,

    /// Emoji icon
    #[serde(default)]
    pub icon: Option<String>,

    /// When the backend recorded it
    #[serde(default)]
    pub earned_at: Option<Time>,
}

impl Badge {
    /// Materialize a freshly inserted badge.
    pub fn from_new(id: BadgeId, new: NewBadge, earned_at: Time) -> Self {
        Self {
            id,
            user_id: new.user_id,
            name: new.name,
            description: new.description,
            icon: Some(new.icon),
            earned_at: Some(earned_at),
        }
    }

    /// Icon for display.
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or("🏆")
    }
}

/// Insert payload for a badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBadge {
    /// Owning user
    pub user_id: UserId,
    /// Badge title
    pub name: String,
    /// What it was awarded for
    pub description: String,
    /// Emoji icon
    pub icon: String,
}

/// A completed-session count that awards a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    /// Exact completed-session count that triggers the badge
    pub completed_sessions: usize,
    /// Badge title
    pub name: &'static str,
    /// Badge description
    pub description: &'static str,
    /// Badge icon
    pub icon: &'static str,
}

impl Milestone {
    /// Badge payload for `user_id`.
    pub fn badge_for(&self, user_id: UserId) -> NewBadge {
        NewBadge {
            user_id,
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
        }
    }
}

/// Known milestones.
pub const MILESTONES: &[Milestone] = &[Milestone {
    completed_sessions: 5,
    name: "5 Sessions Completed",
    description: "Completed your first 5 focus sessions",
    icon: "🎯",
}];

/// Milestone reached at exactly `completed_sessions`, if any.
pub fn milestone_for(completed_sessions: usize) -> Option<&'static Milestone> {
    MILESTONES
        .iter()
        .find(|m| m.completed_sessions == completed_sessions)
}

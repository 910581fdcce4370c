//! Distraction events.

use serde::{Deserialize, Serialize};
use crate::id::{DistractionId, SessionId, UserId};
use crate::Time;

/// Where a loss of attention was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractionKind {
    /// Browser tab hidden
    TabSwitch,
    /// Window lost focus
    WindowBlur,
    /// Native app moved to the background
    AppBackground,
    /// No input for a while
    Idle,
}

impl DistractionKind {
    /// Every kind, in display order.
    pub const ALL: [DistractionKind; 4] = [
        DistractionKind::TabSwitch,
        DistractionKind::WindowBlur,
        DistractionKind::AppBackground,
        DistractionKind::Idle,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistractionKind::TabSwitch => "tab_switch",
            DistractionKind::WindowBlur => "window_blur",
            DistractionKind::AppBackground => "app_background",
            DistractionKind::Idle => "idle",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DistractionKind::TabSwitch => "Tab Switch",
            DistractionKind::WindowBlur => "Window Blur",
            DistractionKind::AppBackground => "App Background",
            DistractionKind::Idle => "Idle Time",
        }
    }
}

impl std::fmt::Display for DistractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown distraction kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown distraction kind: {0}")]
pub struct ParseKindError(pub String);

impl std::str::FromStr for DistractionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistractionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A logged loss of attention (`distractions` row). Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distraction {
    /// Unique identifier
    pub id: DistractionId,

    /// Owning user
    pub user_id: UserId,

    /// Session the distraction happened in
    pub session_id: SessionId,

    /// Source of the event
    #[serde(rename = "type")]
    pub kind: DistractionKind,

    /// When it happened
    pub timestamp: Time,
}

impl Distraction {
    /// Materialize a freshly inserted distraction.
    pub fn from_new(id: DistractionId, new: NewDistraction) -> Self {
        Self {
            id,
            user_id: new.user_id,
            session_id: new.session_id,
            kind: new.kind,
            timestamp: new.timestamp,
        }
    }
}

/// Insert payload for a distraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDistraction {
    /// Owning user
    pub user_id: UserId,

    /// Parent session
    pub session_id: SessionId,

    /// Source of the event
    #[serde(rename = "type")]
    pub kind: DistractionKind,

    /// When it happened
    pub timestamp: Time,
}

impl NewDistraction {
    /// Create an insert payload stamped now.
    pub fn new(user_id: UserId, session_id: SessionId, kind: DistractionKind) -> Self {
        Self {
            user_id,
            session_id,
            kind,
            timestamp: chrono::Utc::now(),
        }
    }
}

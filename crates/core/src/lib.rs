//! FocusForge core data models.
//!
//! Records mirror the rows kept by the hosted backend (sessions,
//! distractions, profiles, badges) together with the scoring rules that
//! are applied when a focus session completes.

#![warn(missing_docs)]

// Identities
mod id;
mod user;

// Records
mod session;
mod distraction;
mod profile;
mod badge;

// Read filters
mod query;

// Serde helpers
mod nullable;

// Re-exports
pub use id::*;
pub use user::AuthUser;

pub use session::{
    xp_for_distractions, NewSession, Session, SessionUpdate, XP_BASE, XP_FLOOR,
    XP_PENALTY_PER_DISTRACTION,
};
pub use distraction::{Distraction, DistractionKind, NewDistraction, ParseKindError};
pub use profile::{next_streak, Profile, ProfileUpdate};
pub use badge::{milestone_for, Badge, Milestone, NewBadge, MILESTONES};
pub use query::{RecordQuery, SortOrder};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

//! Backend trait abstraction.

use async_trait::async_trait;
use focusforge_core::{
    AuthUser, Badge, Distraction, NewBadge, NewDistraction, NewSession, Profile, ProfileUpdate,
    RecordQuery, Session, SessionId, SessionUpdate,
};

/// Error type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport error
    #[cfg(feature = "rest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The call needs a signed-in user with a token
    #[error("not authenticated")]
    Unauthorized,

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// The hosted data service.
///
/// Every call is scoped to the given user; implementations never return
/// another user's rows.
#[async_trait]
pub trait Backend: Send + Sync {
    // === Session operations ===

    /// Insert a session and return the stored row (with its id).
    async fn insert_session(&self, user: &AuthUser, session: &NewSession) -> Result<Session>;

    /// Patch a session.
    async fn update_session(
        &self,
        user: &AuthUser,
        id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<()>;

    /// Hard-delete a session. Distractions referencing it are kept.
    async fn delete_session(&self, user: &AuthUser, id: &SessionId) -> Result<()>;

    /// List the user's sessions ordered by start time.
    async fn list_sessions(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Session>>;

    // === Distraction operations ===

    /// Insert a distraction.
    async fn insert_distraction(
        &self,
        user: &AuthUser,
        distraction: &NewDistraction,
    ) -> Result<Distraction>;

    /// List the user's distractions ordered by timestamp.
    async fn list_distractions(
        &self,
        user: &AuthUser,
        query: &RecordQuery,
    ) -> Result<Vec<Distraction>>;

    // === Profile operations ===

    /// Load the user's profile. `None` when the backend has no row.
    async fn load_profile(&self, user: &AuthUser) -> Result<Option<Profile>>;

    /// Write completion totals to the user's profile.
    async fn update_profile(&self, user: &AuthUser, update: &ProfileUpdate) -> Result<()>;

    // === Badge operations ===

    /// Insert a badge.
    async fn insert_badge(&self, user: &AuthUser, badge: &NewBadge) -> Result<Badge>;

    /// List the user's badges ordered by award time.
    async fn list_badges(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Badge>>;

    // === Derived reads ===

    /// Number of completed sessions.
    async fn count_completed_sessions(&self, user: &AuthUser) -> Result<usize> {
        Ok(self
            .list_sessions(user, &RecordQuery::all().completed())
            .await?
            .len())
    }
}

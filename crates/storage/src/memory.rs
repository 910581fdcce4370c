//! In-process backend.
//!
//! Keeps every record in memory behind a single async mutex. Used by tests
//! and by the CLI when no hosted backend is configured.

use async_trait::async_trait;
use focusforge_core::{
    AuthUser, Badge, BadgeId, Distraction, DistractionId, NewBadge, NewDistraction, NewSession,
    Profile, ProfileUpdate, RecordQuery, Session, SessionId, SessionUpdate,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Backend, BackendError, Result};

#[derive(Default)]
struct State {
    sessions: HashMap<SessionId, Session>,
    distractions: Vec<Distraction>,
    profiles: HashMap<focusforge_core::UserId, Profile>,
    badges: Vec<Badge>,
}

/// Memory-backed implementation of [`Backend`].
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile row.
    pub async fn put_profile(&self, profile: Profile) {
        self.state
            .lock()
            .await
            .profiles
            .insert(profile.id.clone(), profile);
    }

    /// Seed a session row as-is.
    pub async fn put_session(&self, session: Session) {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_session(&self, user: &AuthUser, session: &NewSession) -> Result<Session> {
        let mut new = session.clone();
        new.user_id = user.id.clone();
        let row = Session::from_new(SessionId::generate(), new);

        debug!(session = %row.id, "memory: insert session");
        self.state
            .lock()
            .await
            .sessions
            .insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn update_session(
        &self,
        user: &AuthUser,
        id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(id) {
            Some(session) if session.user_id == user.id => {
                session.apply(update);
                Ok(())
            }
            _ => Err(BackendError::NotFound(format!("session {}", id))),
        }
    }

    async fn delete_session(&self, user: &AuthUser, id: &SessionId) -> Result<()> {
        let mut state = self.state.lock().await;
        let owned = state
            .sessions
            .get(id)
            .map(|s| s.user_id == user.id)
            .unwrap_or(false);
        if owned {
            state.sessions.remove(id);
        }
        Ok(())
    }

    async fn list_sessions(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Session>> {
        let state = self.state.lock().await;
        let rows = state
            .sessions
            .values()
            .filter(|s| s.user_id == user.id)
            .filter(|s| !query.completed_only || s.completed)
            .filter(|s| query.admits(Some(s.started_at)))
            .cloned()
            .collect();
        Ok(query.finish(rows, |s: &Session| Some(s.started_at)))
    }

    async fn insert_distraction(
        &self,
        user: &AuthUser,
        distraction: &NewDistraction,
    ) -> Result<Distraction> {
        let mut new = distraction.clone();
        new.user_id = user.id.clone();
        let row = Distraction::from_new(DistractionId::generate(), new);

        self.state.lock().await.distractions.push(row.clone());
        Ok(row)
    }

    async fn list_distractions(
        &self,
        user: &AuthUser,
        query: &RecordQuery,
    ) -> Result<Vec<Distraction>> {
        let state = self.state.lock().await;
        let rows = state
            .distractions
            .iter()
            .filter(|d| d.user_id == user.id)
            .filter(|d| query.admits(Some(d.timestamp)))
            .cloned()
            .collect();
        Ok(query.finish(rows, |d: &Distraction| Some(d.timestamp)))
    }

    async fn load_profile(&self, user: &AuthUser) -> Result<Option<Profile>> {
        Ok(self.state.lock().await.profiles.get(&user.id).cloned())
    }

    async fn update_profile(&self, user: &AuthUser, update: &ProfileUpdate) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .profiles
            .entry(user.id.clone())
            .or_insert_with(|| Profile::empty(user.id.clone()))
            .apply(update);
        Ok(())
    }

    async fn insert_badge(&self, user: &AuthUser, badge: &NewBadge) -> Result<Badge> {
        let mut new = badge.clone();
        new.user_id = user.id.clone();
        let row = Badge::from_new(BadgeId::generate(), new, chrono::Utc::now());

        self.state.lock().await.badges.push(row.clone());
        Ok(row)
    }

    async fn list_badges(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Badge>> {
        let state = self.state.lock().await;
        let rows = state
            .badges
            .iter()
            .filter(|b| b.user_id == user.id)
            .filter(|b| query.admits(b.earned_at))
            .cloned()
            .collect();
        Ok(query.finish(rows, |b: &Badge| b.earned_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusforge_core::DistractionKind;

    #[tokio::test]
    async fn test_session_roundtrip_and_scoping() {
        let backend = MemoryBackend::new();
        let alice = AuthUser::new("alice");
        let bob = AuthUser::new("bob");

        let session = backend
            .insert_session(&alice, &NewSession::new(alice.id.clone(), "Outline", 25))
            .await
            .unwrap();
        assert_eq!(session.user_id, alice.id);

        assert_eq!(backend.list_sessions(&alice, &RecordQuery::all()).await.unwrap().len(), 1);
        assert!(backend.list_sessions(&bob, &RecordQuery::all()).await.unwrap().is_empty());

        // Bob can neither patch nor delete Alice's row
        let err = backend
            .update_session(&bob, &session.id, &SessionUpdate::distractions(3))
            .await;
        assert!(matches!(err, Err(BackendError::NotFound(_))));
        backend.delete_session(&bob, &session.id).await.unwrap();
        assert_eq!(backend.list_sessions(&alice, &RecordQuery::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_filter_and_count() {
        let backend = MemoryBackend::new();
        let user = AuthUser::local();

        for i in 0..3 {
            let s = backend
                .insert_session(&user, &NewSession::new(user.id.clone(), format!("S{}", i), 25))
                .await
                .unwrap();
            if i > 0 {
                backend
                    .update_session(&user, &s.id, &SessionUpdate::completed(chrono::Utc::now(), 50, 0))
                    .await
                    .unwrap();
            }
        }

        assert_eq!(backend.count_completed_sessions(&user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_keeps_distractions() {
        let backend = MemoryBackend::new();
        let user = AuthUser::local();
        let s = backend
            .insert_session(&user, &NewSession::new(user.id.clone(), "Read", 10))
            .await
            .unwrap();
        backend
            .insert_distraction(
                &user,
                &NewDistraction::new(user.id.clone(), s.id.clone(), DistractionKind::TabSwitch),
            )
            .await
            .unwrap();

        backend.delete_session(&user, &s.id).await.unwrap();
        assert!(backend.list_sessions(&user, &RecordQuery::all()).await.unwrap().is_empty());
        assert_eq!(backend.list_distractions(&user, &RecordQuery::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_profile_upserts() {
        let backend = MemoryBackend::new();
        let user = AuthUser::local();
        assert!(backend.load_profile(&user).await.unwrap().is_none());

        let now = chrono::Utc::now();
        backend
            .update_profile(&user, &ProfileUpdate { xp: 50, streak_count: 1, last_session_date: now })
            .await
            .unwrap();

        let profile = backend.load_profile(&user).await.unwrap().unwrap();
        assert_eq!(profile.xp, 50);
        assert_eq!(profile.last_session_date, Some(now));
    }
}

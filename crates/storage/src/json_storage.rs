//! JSON file backend.
//!
//! Stores one JSON file per record under a data directory. Useful for
//! offline runs of the CLI; the hosted backend remains the source of truth
//! in production.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use focusforge_core::{
    AuthUser, Badge, BadgeId, Distraction, DistractionId, NewBadge, NewDistraction, NewSession,
    Profile, ProfileUpdate, RecordQuery, Session, SessionId, SessionUpdate,
};
use tokio::fs;
use tracing::{debug, warn};

use super::{Backend, BackendError, Result};

/// File-based JSON backend.
pub struct JsonBackend {
    root: PathBuf,
}

impl JsonBackend {
    /// Open (and create if needed) a data directory.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("sessions")).await?;
        fs::create_dir_all(root.join("distractions")).await?;
        fs::create_dir_all(root.join("profiles")).await?;
        fs::create_dir_all(root.join("badges")).await?;

        debug!(root = %root.display(), "opened JSON backend");
        Ok(Self { root })
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        self.root.join("sessions").join(format!("{}.json", id))
    }
    fn distraction_path(&self, id: &DistractionId) -> PathBuf {
        self.root.join("distractions").join(format!("{}.json", id))
    }
    fn profile_path(&self, user: &AuthUser) -> PathBuf {
        self.root.join("profiles").join(format!("{}.json", user.id))
    }
    fn badge_path(&self, id: &BadgeId) -> PathBuf {
        self.root.join("badges").join(format!("{}.json", id))
    }

    async fn load_owned_session(&self, user: &AuthUser, id: &SessionId) -> Result<Option<Session>> {
        let session: Option<Session> = read_json(&self.session_path(id)).await?;
        Ok(session.filter(|s| s.user_id == user.id))
    }
}

#[async_trait]
impl Backend for JsonBackend {
    async fn insert_session(&self, user: &AuthUser, session: &NewSession) -> Result<Session> {
        let mut new = session.clone();
        new.user_id = user.id.clone();
        let row = Session::from_new(SessionId::generate(), new);
        write_json(&self.session_path(&row.id), &row).await?;
        Ok(row)
    }

    async fn update_session(
        &self,
        user: &AuthUser,
        id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<()> {
        let mut session = self
            .load_owned_session(user, id)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("session {}", id)))?;
        session.apply(update);
        write_json(&self.session_path(id), &session).await
    }

    async fn delete_session(&self, user: &AuthUser, id: &SessionId) -> Result<()> {
        if self.load_owned_session(user, id).await?.is_none() {
            return Ok(());
        }
        fs::remove_file(self.session_path(id)).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }

    async fn list_sessions(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Session>> {
        let all: Vec<Session> = list_dir(&self.root.join("sessions")).await?;
        let rows = all
            .into_iter()
            .filter(|s| s.user_id == user.id)
            .filter(|s| !query.completed_only || s.completed)
            .filter(|s| query.admits(Some(s.started_at)))
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
        write_json(&self.distraction_path(&row.id), &row).await?;
        Ok(row)
    }

    async fn list_distractions(
        &self,
        user: &AuthUser,
        query: &RecordQuery,
    ) -> Result<Vec<Distraction>> {
        let all: Vec<Distraction> = list_dir(&self.root.join("distractions")).await?;
        let rows = all
            .into_iter()
            .filter(|d| d.user_id == user.id)
            .filter(|d| query.admits(Some(d.timestamp)))
            .collect();
        Ok(query.finish(rows, |d: &Distraction| Some(d.timestamp)))
    }

    async fn load_profile(&self, user: &AuthUser) -> Result<Option<Profile>> {
        read_json(&self.profile_path(user)).await
    }

    async fn update_profile(&self, user: &AuthUser, update: &ProfileUpdate) -> Result<()> {
        let mut profile = self
            .load_profile(user)
            .await?
            .unwrap_or_else(|| Profile::empty(user.id.clone()));
        profile.apply(update);
        write_json(&self.profile_path(user), &profile).await
    }

    async fn insert_badge(&self, user: &AuthUser, badge: &NewBadge) -> Result<Badge> {
        let mut new = badge.clone();
        new.user_id = user.id.clone();
        let row = Badge::from_new(BadgeId::generate(), new, chrono::Utc::now());
        write_json(&self.badge_path(&row.id), &row).await?;
        Ok(row)
    }

    async fn list_badges(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Badge>> {
        let all: Vec<Badge> = list_dir(&self.root.join("badges")).await?;
        let rows = all
            .into_iter()
            .filter(|b| b.user_id == user.id)
            .filter(|b| query.admits(b.earned_at))
            .collect();
        Ok(query.finish(rows, |b: &Badge| b.earned_at))
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %entry.path().display(), "skipping unreadable record: {}", e),
        }
    }
    Ok(items)
}

//! Session lifecycle controller.
//!
//! Drives one focus session at a time through
//! `Idle -> Running <-> Paused -> Completed`, persisting every transition
//! through a [`Backend`]. Local state only changes once the corresponding
//! write has succeeded.

use chrono::{FixedOffset, Local, Utc};
use focusforge_core::{
    milestone_for, xp_for_distractions, AuthUser, Badge, Distraction, NewDistraction, NewSession,
    Profile, Session, SessionId, SessionUpdate,
};
use focusforge_storage::{Backend, BackendError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::attention::{AttentionMonitor, AttentionSignal};
use crate::config::SessionConfig;
use crate::timer::{SessionTimer, TickOutcome};

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors reported by the controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No signed-in user was supplied
    #[error("you need to be logged in to track sessions")]
    NotAuthenticated,

    /// Goal was empty after trimming
    #[error("please enter a focus goal for this session")]
    EmptyGoal,

    /// Duration outside `1..=max`
    #[error("duration must be between 1 and {max} minutes (got {got})")]
    InvalidDuration {
        /// Requested minutes
        got: u32,
        /// Configured maximum
        max: u32,
    },

    /// Action not allowed in the current state
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// Current state
        state: SessionState,
        /// Attempted action
        action: &'static str,
    },

    /// Backend write or read failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session in progress
    Idle,
    /// Session active and counting down
    Running,
    /// Session active, countdown stopped
    Paused,
    /// Session finished and recorded
    Completed,
}

impl SessionState {
    /// True for both active states.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Running | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A distraction that was recorded.
#[derive(Debug, Clone)]
pub struct LoggedDistraction {
    /// The stored row
    pub distraction: Distraction,
    /// Session tally after this distraction
    pub count: u32,
    /// Set when the session's count could not be updated
    pub warning: Option<String>,
}

/// What happened on a tick.
#[derive(Debug, Clone)]
pub enum TickUpdate {
    /// Not running
    Idle,
    /// Counting down
    Counting {
        /// Seconds left
        remaining_seconds: u32,
    },
    /// The countdown reached zero and the session was completed
    Completed(CompletionReport),
}

/// Outcome of a completed session.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    /// The completed session
    pub session_id: SessionId,
    /// XP awarded for this session
    pub xp_earned: u32,
    /// Distractions recorded during the session
    pub distractions: u32,
    /// Profile XP after this session, if the profile was updated
    pub total_xp: Option<u32>,
    /// Streak after this session, if the profile was updated
    pub streak: Option<u32>,
    /// Badge awarded by this session
    pub badge: Option<Badge>,
    /// Follow-up writes that failed after the session was recorded
    pub warnings: Vec<String>,
}

impl CompletionReport {
    /// One-line summary for notifications.
    pub fn summary(&self) -> String {
        let focus = if self.distractions == 0 {
            "Perfect focus!".to_string()
        } else {
            format!("{} distractions detected.", self.distractions)
        };
        format!("Great job! You earned {} XP. {}", self.xp_earned, focus)
    }
}

struct ActiveSession {
    user: AuthUser,
    session: Session,
}

/// Session lifecycle controller.
pub struct SessionController {
    backend: Arc<dyn Backend>,
    config: SessionConfig,
    offset: Option<FixedOffset>,
    state: SessionState,
    timer: SessionTimer,
    monitor: AttentionMonitor,
    active: Option<ActiveSession>,
    distractions: u32,
}

impl SessionController {
    /// Create an idle controller.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let config = SessionConfig::default();
        Self {
            backend,
            timer: SessionTimer::new(config.default_duration_minutes),
            config,
            offset: None,
            state: SessionState::Idle,
            monitor: AttentionMonitor::new(),
            active: None,
            distractions: 0,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.timer = SessionTimer::new(config.default_duration_minutes);
        self.config = config;
        self
    }

    /// Use a fixed UTC offset for calendar days instead of the local zone.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Countdown for the current session.
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    /// Attention tracking for the current session.
    pub fn monitor(&self) -> &AttentionMonitor {
        &self.monitor
    }

    /// Distractions recorded for the current session.
    pub fn distractions(&self) -> u32 {
        self.distractions
    }

    /// The session in progress or just completed.
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state,
            action,
        }
    }

    /// Start a new session and begin counting down.
    pub async fn start(
        &mut self,
        user: Option<&AuthUser>,
        goal: &str,
        duration_minutes: u32,
    ) -> Result<Session> {
        if self.state.is_active() {
            return Err(self.invalid("start"));
        }
        let user = user.ok_or(SessionError::NotAuthenticated)?;
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(SessionError::EmptyGoal);
        }
        if duration_minutes == 0 || duration_minutes > self.config.max_duration_minutes {
            return Err(SessionError::InvalidDuration {
                got: duration_minutes,
                max: self.config.max_duration_minutes,
            });
        }

        let new = NewSession::new(user.id.clone(), goal, duration_minutes);
        let session = self.backend.insert_session(user, &new).await?;

        info!(session = %session.id, duration_minutes, "session started");
        self.timer = SessionTimer::new(duration_minutes);
        self.timer.start();
        self.monitor.restart();
        self.distractions = 0;
        self.state = SessionState::Running;
        self.active = Some(ActiveSession {
            user: user.clone(),
            session: session.clone(),
        });
        Ok(session)
    }

    /// Stop the countdown. No writes.
    pub fn pause(&mut self) -> Result<()> {
        if self.state != SessionState::Running {
            return Err(self.invalid("pause"));
        }
        self.timer.pause();
        self.monitor.detach();
        self.state = SessionState::Paused;
        debug!(remaining = self.timer.remaining_seconds(), "session paused");
        Ok(())
    }

    /// Continue a paused countdown. No writes.
    ///
    /// A countdown that already reached zero can only be completed or reset.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != SessionState::Paused || self.timer.is_finished() {
            return Err(self.invalid("resume"));
        }
        self.timer.resume();
        self.monitor.attach();
        self.state = SessionState::Running;
        debug!(remaining = self.timer.remaining_seconds(), "session resumed");
        Ok(())
    }

    /// Advance the countdown by one tick, completing the session when it
    /// reaches zero.
    pub async fn tick(&mut self) -> Result<TickUpdate> {
        if self.state != SessionState::Running {
            return Ok(TickUpdate::Idle);
        }
        match self.timer.tick() {
            TickOutcome::Stopped => Ok(TickUpdate::Idle),
            TickOutcome::Counting(remaining_seconds) => {
                Ok(TickUpdate::Counting { remaining_seconds })
            }
            TickOutcome::Finished => {
                let report = self.finish().await?;
                Ok(TickUpdate::Completed(report))
            }
        }
    }

    /// Feed an attention signal. Records a distraction on a fresh loss of
    /// attention while running.
    pub async fn observe(&mut self, signal: AttentionSignal) -> Result<Option<LoggedDistraction>> {
        if self.state != SessionState::Running {
            return Ok(None);
        }
        let Some(kind) = self.monitor.observe(signal) else {
            return Ok(None);
        };
        let Some(active) = self.active.as_ref() else {
            return Ok(None);
        };

        let new = NewDistraction::new(active.user.id.clone(), active.session.id.clone(), kind);
        let distraction = match self.backend.insert_distraction(&active.user, &new).await {
            Ok(row) => row,
            Err(e) => {
                self.monitor.revert_loss();
                return Err(e.into());
            }
        };

        self.distractions += 1;
        info!(session = %active.session.id, kind = %kind, count = self.distractions, "distraction logged");

        let warning = match self
            .backend
            .update_session(
                &active.user,
                &active.session.id,
                &SessionUpdate::distractions(self.distractions),
            )
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(session = %active.session.id, "failed to sync distraction count: {}", e);
                Some(format!("distraction count not saved: {}", e))
            }
        };

        Ok(Some(LoggedDistraction {
            distraction,
            count: self.distractions,
            warning,
        }))
    }

    /// Complete a session whose countdown has run out.
    ///
    /// Returns `Ok(None)` when the session is already completed. Used to
    /// retry after a failed completion write.
    pub async fn complete(&mut self) -> Result<Option<CompletionReport>> {
        match self.state {
            SessionState::Completed => Ok(None),
            SessionState::Running | SessionState::Paused if self.timer.is_finished() => {
                self.finish().await.map(Some)
            }
            _ => Err(self.invalid("complete")),
        }
    }

    async fn finish(&mut self) -> Result<CompletionReport> {
        let Some(active) = self.active.as_mut() else {
            return Err(self.invalid("complete"));
        };

        let now = Utc::now();
        let xp_earned = xp_for_distractions(self.distractions);
        let update = SessionUpdate::completed(now, xp_earned, self.distractions);

        if let Err(e) = self
            .backend
            .update_session(&active.user, &active.session.id, &update)
            .await
        {
            warn!(session = %active.session.id, "completion write failed: {}", e);
            self.timer.pause();
            self.monitor.detach();
            self.state = SessionState::Paused;
            return Err(e.into());
        }

        active.session.apply(&update);
        self.state = SessionState::Completed;
        self.monitor.detach();
        info!(session = %active.session.id, xp_earned, distractions = self.distractions, "session completed");

        let user = active.user.clone();
        let mut report = CompletionReport {
            session_id: active.session.id.clone(),
            xp_earned,
            distractions: self.distractions,
            total_xp: None,
            streak: None,
            badge: None,
            warnings: Vec::new(),
        };

        // Profile totals
        match self.backend.load_profile(&user).await {
            Ok(profile) => {
                let profile = profile.unwrap_or_else(|| Profile::empty(user.id.clone()));
                let next = match self.offset {
                    Some(offset) => profile.after_completion(xp_earned, &now.with_timezone(&offset)),
                    None => profile.after_completion(xp_earned, &now.with_timezone(&Local)),
                };
                match self.backend.update_profile(&user, &next).await {
                    Ok(()) => {
                        report.total_xp = Some(next.xp);
                        report.streak = Some(next.streak_count);
                    }
                    Err(e) => {
                        warn!(user = %user.id, "profile update failed: {}", e);
                        report.warnings.push(format!("profile not updated: {}", e));
                    }
                }
            }
            Err(e) => {
                warn!(user = %user.id, "profile read failed: {}", e);
                report.warnings.push(format!("profile not updated: {}", e));
            }
        }

        // Milestone badges
        match self.backend.count_completed_sessions(&user).await {
            Ok(count) => {
                if let Some(milestone) = milestone_for(count) {
                    match self.backend.insert_badge(&user, &milestone.badge_for(user.id.clone())).await {
                        Ok(badge) => {
                            info!(user = %user.id, badge = %badge.name, "badge awarded");
                            report.badge = Some(badge);
                        }
                        Err(e) => {
                            warn!(user = %user.id, "badge insert failed: {}", e);
                            report.warnings.push(format!("badge not awarded: {}", e));
                        }
                    }
                }
            }
            Err(e) => {
                warn!(user = %user.id, "session count failed: {}", e);
                report.warnings.push(format!("badges not checked: {}", e));
            }
        }

        Ok(report)
    }

    /// Abandon the active session: delete its record and clear the tally.
    /// Distractions already written stay in place.
    pub async fn reset(&mut self) -> Result<()> {
        if !self.state.is_active() {
            return Err(self.invalid("reset"));
        }
        if let Some(active) = &self.active {
            self.backend
                .delete_session(&active.user, &active.session.id)
                .await?;
            info!(session = %active.session.id, "session reset");
        }

        self.timer.reset();
        self.monitor.detach();
        self.distractions = 0;
        self.active = None;
        self.state = SessionState::Idle;
        Ok(())
    }
}

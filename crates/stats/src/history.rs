//! Session history and distraction log views.

use chrono::{DateTime, TimeZone, Utc};
use focusforge_core::{Distraction, DistractionKind, Session, SessionId};
use serde::Serialize;
use std::fmt;

/// Distractions shown in the log.
pub const DISTRACTION_LOG_LIMIT: usize = 50;

/// Sessions shown in the history.
pub const SESSION_HISTORY_LIMIT: usize = 20;

/// One row of the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionLine {
    pub id: SessionId,
    pub goal: String,
    pub started_at: String,
    pub minutes: u32,
    pub distractions: u32,
    pub completed: bool,
}

impl SessionLine {
    pub fn new<Tz: TimeZone>(session: &Session, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            id: session.id.clone(),
            goal: session.display_goal().to_string(),
            started_at: session
                .started_at
                .with_timezone(tz)
                .format("%b %-d, %Y • %-I:%M %p")
                .to_string(),
            minutes: session.duration,
            distractions: session.distractions_count,
            completed: session.completed,
        }
    }

    /// `Completed` or `Incomplete`.
    pub fn status(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Incomplete"
        }
    }

    /// `1 distraction`, `3 distractions`.
    pub fn distractions_text(&self) -> String {
        let noun = if self.distractions == 1 { "distraction" } else { "distractions" };
        format!("{} {}", self.distractions, noun)
    }
}

impl fmt::Display for SessionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]\n  {} • {} min • {}",
            self.goal,
            self.status(),
            self.started_at,
            self.minutes,
            self.distractions_text()
        )
    }
}

/// One row of the distraction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistractionLine {
    pub kind: DistractionKind,
    pub label: &'static str,
    pub at: String,
    pub session_id: SessionId,
}

impl DistractionLine {
    pub fn new<Tz: TimeZone>(distraction: &Distraction, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            kind: distraction.kind,
            label: distraction.kind.label(),
            at: distraction
                .timestamp
                .with_timezone(tz)
                .format("%b %-d, %-I:%M %p")
                .to_string(),
            session_id: distraction.session_id.clone(),
        }
    }
}

impl fmt::Display for DistractionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<15} {}", self.label, self.at)
    }
}

/// Recent sessions and distractions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistractionLog {
    pub sessions: Vec<SessionLine>,
    pub distractions: Vec<DistractionLine>,
}

impl DistractionLog {
    /// Build the view from already-fetched rows.
    pub fn from_records<Tz: TimeZone>(sessions: &[Session], distractions: &[Distraction], tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let mut sessions: Vec<&Session> = sessions.iter().collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        let mut distractions: Vec<&Distraction> = distractions.iter().collect();
        distractions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Self {
            sessions: sessions
                .into_iter()
                .take(SESSION_HISTORY_LIMIT)
                .map(|s| SessionLine::new(s, tz))
                .collect(),
            distractions: distractions
                .into_iter()
                .take(DISTRACTION_LOG_LIMIT)
                .map(|d| DistractionLine::new(d, tz))
                .collect(),
        }
    }

    /// Distractions per kind, in display order.
    pub fn kind_counts(&self) -> Vec<(DistractionKind, usize)> {
        DistractionKind::ALL
            .iter()
            .map(|kind| (*kind, self.distractions.iter().filter(|d| d.kind == *kind).count()))
            .collect()
    }
}

/// Age of a timestamp relative to `now`, e.g. `5m ago`.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use focusforge_core::{DistractionId, NewDistraction, NewSession, UserId};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn test_session_line() {
        let mut new = NewSession::new(UserId::new("u1"), "", 25);
        new.started_at = at(14, 5);
        let mut session = Session::from_new(SessionId::new("s1"), new);
        session.distractions_count = 1;

        let line = SessionLine::new(&session, &Utc);
        assert_eq!(line.goal, "Untitled Session");
        assert_eq!(line.started_at, "Mar 4, 2025 • 2:05 PM");
        assert_eq!(line.status(), "Incomplete");
        assert_eq!(line.distractions_text(), "1 distraction");

        session.completed = true;
        session.distractions_count = 0;
        let line = SessionLine::new(&session, &Utc);
        assert_eq!(line.status(), "Completed");
        assert_eq!(line.distractions_text(), "0 distractions");
    }

    #[test]
    fn test_log_is_newest_first_and_limited() {
        let user = UserId::new("u1");
        let distractions: Vec<Distraction> = (0..60)
            .map(|i| {
                let mut new = NewDistraction::new(user.clone(), SessionId::new("s1"), DistractionKind::Idle);
                new.timestamp = at(8, 0) + Duration::minutes(i);
                Distraction::from_new(DistractionId::generate(), new)
            })
            .collect();

        let log = DistractionLog::from_records(&[], &distractions, &Utc);
        assert_eq!(log.distractions.len(), DISTRACTION_LOG_LIMIT);
        assert_eq!(log.distractions[0].at, "Mar 4, 8:59 AM");
        assert_eq!(log.distractions[0].label, "Idle Time");
        assert_eq!(log.kind_counts()[3], (DistractionKind::Idle, 50));
    }

    #[test]
    fn test_time_ago() {
        let now = at(12, 0);
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }
}

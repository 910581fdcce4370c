//! Async driver for a [`SessionController`].
//!
//! One task owns the controller and multiplexes the tick interval, an
//! attention source and a command channel with `tokio::select!`, so every
//! mutation of session state is serialized. Outcomes are published as
//! [`SessionEvent`]s.

use focusforge_core::{AuthUser, Session};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::attention::AttentionSource;
use crate::controller::{CompletionReport, LoggedDistraction, SessionController, TickUpdate};
use crate::timer::format_clock;

/// Requests accepted by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Start a new session
    Start {
        /// Signed-in user, if any
        user: Option<AuthUser>,
        /// Focus goal
        goal: String,
        /// Planned length
        duration_minutes: u32,
    },
    /// Pause the countdown
    Pause,
    /// Resume the countdown
    Resume,
    /// Abandon the session
    Reset,
    /// Retry completion after a failed write
    Complete,
    /// Stop the runner
    Shutdown,
}

/// Notifications published by the runner.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A session was created
    Started(Session),
    /// One second elapsed
    Tick {
        /// Seconds left
        remaining_seconds: u32,
        /// `m:ss` rendering
        display: String,
    },
    /// Countdown paused
    Paused,
    /// Countdown resumed
    Resumed,
    /// A distraction was recorded
    DistractionLogged(LoggedDistraction),
    /// The session completed
    Completed(CompletionReport),
    /// The session was abandoned
    Reset,
    /// An action failed; state is unchanged
    Error(String),
}

/// Cloneable handle for sending commands to a running [`SessionRunner`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Queue a command. Returns `false` once the runner has stopped.
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).await.is_ok()
    }

    /// Queue a command from a non-async thread, e.g. a terminal reader.
    pub fn blocking_send(&self, command: SessionCommand) -> bool {
        self.tx.blocking_send(command).is_ok()
    }

    /// Start a session.
    pub async fn start(&self, user: Option<AuthUser>, goal: impl Into<String>, duration_minutes: u32) -> bool {
        self.send(SessionCommand::Start {
            user,
            goal: goal.into(),
            duration_minutes,
        })
        .await
    }

    pub async fn pause(&self) -> bool {
        self.send(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> bool {
        self.send(SessionCommand::Resume).await
    }

    pub async fn reset(&self) -> bool {
        self.send(SessionCommand::Reset).await
    }

    pub async fn complete(&self) -> bool {
        self.send(SessionCommand::Complete).await
    }

    pub async fn shutdown(&self) -> bool {
        self.send(SessionCommand::Shutdown).await
    }
}

/// Drives a controller from ticks, attention signals and commands.
pub struct SessionRunner<A: AttentionSource> {
    controller: SessionController,
    source: A,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<SessionEvent>,
}

impl<A: AttentionSource> SessionRunner<A> {
    /// Create a runner plus its command handle and event stream.
    pub fn new(
        controller: SessionController,
        source: A,
    ) -> (Self, SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(256);
        let runner = Self {
            controller,
            source,
            commands: cmd_rx,
            events: event_tx,
        };
        (runner, SessionHandle { tx: cmd_tx }, event_rx)
    }

    /// Run until shutdown or until every command handle is dropped.
    /// Returns the controller in its final state.
    pub async fn run(self) -> SessionController {
        let SessionRunner {
            mut controller,
            mut source,
            mut commands,
            events,
        } = self;

        let mut ticker = interval(controller.config().tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        let mut source_open = true;

        info!("session runner started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match controller.tick().await {
                        Ok(TickUpdate::Idle) => {}
                        Ok(TickUpdate::Counting { remaining_seconds }) => {
                            emit(&events, SessionEvent::Tick {
                                remaining_seconds,
                                display: format_clock(remaining_seconds),
                            }).await;
                        }
                        Ok(TickUpdate::Completed(report)) => {
                            emit(&events, SessionEvent::Tick {
                                remaining_seconds: 0,
                                display: format_clock(0),
                            }).await;
                            emit(&events, SessionEvent::Completed(report)).await;
                        }
                        Err(e) => emit(&events, SessionEvent::Error(e.to_string())).await,
                    }
                }

                signal = source.next_signal(), if source_open => {
                    let Some(signal) = signal else {
                        debug!("attention source closed");
                        source_open = false;
                        continue;
                    };
                    match controller.observe(signal).await {
                        Ok(Some(logged)) => emit(&events, SessionEvent::DistractionLogged(logged)).await,
                        Ok(None) => {}
                        Err(e) => emit(&events, SessionEvent::Error(e.to_string())).await,
                    }
                }

                command = commands.recv() => {
                    let command = match command {
                        None | Some(SessionCommand::Shutdown) => break,
                        Some(command) => command,
                    };
                    let event = match command {
                        SessionCommand::Start { user, goal, duration_minutes } => {
                            let started = controller.start(user.as_ref(), &goal, duration_minutes).await;
                            // Count a full period before the first decrement
                            ticker.reset();
                            started.map(SessionEvent::Started)
                        }
                        SessionCommand::Pause => controller.pause().map(|_| SessionEvent::Paused),
                        SessionCommand::Resume => {
                            ticker.reset();
                            controller.resume().map(|_| SessionEvent::Resumed)
                        }
                        SessionCommand::Reset => controller.reset().await.map(|_| SessionEvent::Reset),
                        SessionCommand::Complete => match controller.complete().await {
                            Ok(Some(report)) => Ok(SessionEvent::Completed(report)),
                            Ok(None) => continue,
                            Err(e) => Err(e),
                        },
                        SessionCommand::Shutdown => break,
                    };
                    match event {
                        Ok(event) => emit(&events, event).await,
                        Err(e) => {
                            warn!("session command failed: {}", e);
                            emit(&events, SessionEvent::Error(e.to_string())).await;
                        }
                    }
                }
            }
        }

        info!(state = %controller.state(), "session runner stopped");
        controller
    }
}

async fn emit(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    // Nobody listening is fine; the controller state is authoritative
    let _ = events.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attention::{attention_channel, AttentionSignal};
    use crate::controller::SessionState;
    use focusforge_core::RecordQuery;
    use focusforge_storage::{Backend, MemoryBackend};
    use std::sync::Arc;

    async fn next_non_tick(events: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
        loop {
            match events.recv().await {
                Some(SessionEvent::Tick { .. }) => {}
                Some(event) => return event,
                None => panic!("runner stopped"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_minute_session_completes_once() {
        let backend = Arc::new(MemoryBackend::new());
        let controller = SessionController::new(backend.clone());
        let (_signals, source) = attention_channel();
        let (runner, handle, mut events) = SessionRunner::new(controller, source);
        let task = tokio::spawn(runner.run());

        let user = AuthUser::local();
        assert!(handle.start(Some(user.clone()), "Inbox zero", 1).await);
        assert!(matches!(events.recv().await, Some(SessionEvent::Started(_))));

        let mut ticks = 0;
        let report = loop {
            match events.recv().await {
                Some(SessionEvent::Tick { .. }) => ticks += 1,
                Some(SessionEvent::Completed(report)) => break report,
                other => panic!("unexpected event: {:?}", other),
            }
        };
        assert_eq!(ticks, 60);
        assert_eq!(report.xp_earned, 50);

        // Let more time pass; nothing else may be published
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        handle.shutdown().await;
        let controller = task.await.unwrap();
        assert!(events.recv().await.is_none());
        assert_eq!(controller.state(), SessionState::Completed);

        let completed = backend.list_sessions(&user, &RecordQuery::all().completed()).await.unwrap();
        assert_eq!(completed.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_and_commands_are_serialized() {
        let backend = Arc::new(MemoryBackend::new());
        let controller = SessionController::new(backend.clone());
        let (signals, source) = attention_channel();
        let (runner, handle, mut events) = SessionRunner::new(controller, source);
        let task = tokio::spawn(runner.run());

        let user = AuthUser::local();
        handle.start(Some(user.clone()), "Reading", 25).await;
        assert!(matches!(next_non_tick(&mut events).await, SessionEvent::Started(_)));

        signals.send(AttentionSignal::AppBackground);
        signals.send(AttentionSignal::AppBackground);
        match next_non_tick(&mut events).await {
            SessionEvent::DistractionLogged(logged) => assert_eq!(logged.count, 1),
            other => panic!("unexpected event: {:?}", other),
        }

        handle.pause().await;
        assert!(matches!(next_non_tick(&mut events).await, SessionEvent::Paused));
        handle.pause().await;
        assert!(matches!(next_non_tick(&mut events).await, SessionEvent::Error(_)));

        handle.reset().await;
        assert!(matches!(next_non_tick(&mut events).await, SessionEvent::Reset));

        drop(handle);
        let controller = task.await.unwrap();
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(backend.list_distractions(&user, &RecordQuery::all()).await.unwrap().len(), 1);
        assert!(backend.list_sessions(&user, &RecordQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_error_is_published() {
        let controller = SessionController::new(Arc::new(MemoryBackend::new()));
        let (_signals, source) = attention_channel();
        let (runner, handle, mut events) = SessionRunner::new(controller, source);
        let task = tokio::spawn(runner.run());

        handle.start(None, "Anything", 25).await;
        match events.recv().await {
            Some(SessionEvent::Error(message)) => assert!(message.contains("logged in")),
            other => panic!("unexpected event: {:?}", other),
        }

        handle.shutdown().await;
        task.await.unwrap();
    }
}

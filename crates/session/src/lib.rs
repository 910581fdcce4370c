//! Focus session lifecycle.
//!
//! Countdown timer, attention monitoring and the controller that persists
//! sessions, distractions, profile totals and badges, plus an async runner
//! that drives the controller from timer ticks, attention signals and user
//! commands.

pub mod attention;
pub mod config;
pub mod controller;
pub mod runner;
pub mod timer;

pub use attention::{
    attention_channel, AttentionMonitor, AttentionSender, AttentionSignal, AttentionSource,
    ChannelSource,
};
pub use config::SessionConfig;
pub use controller::{
    CompletionReport, LoggedDistraction, Result, SessionController, SessionError, SessionState,
    TickUpdate,
};
pub use runner::{SessionCommand, SessionEvent, SessionHandle, SessionRunner};
pub use timer::{format_clock, SessionTimer, TickOutcome};

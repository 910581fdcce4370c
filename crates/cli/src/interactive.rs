//! Interactive focus session on the terminal.
//!
//! Stdin lines are read on a dedicated thread. Control words become runner
//! commands, attention words become signals on a channel source; runner
//! events are rendered as they arrive.

use anyhow::Result;
use focusforge_core::AuthUser;
use focusforge_session::{
    attention_channel, AttentionSender, AttentionSignal, SessionCommand, SessionController,
    SessionEvent, SessionHandle, SessionRunner,
};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::render;

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(SessionCommand),
    Signal(AttentionSignal),
    Help,
    Unknown(String),
}

/// Parse a terminal line. Blank lines yield `None`.
pub fn parse_input(line: &str) -> Option<Input> {
    let word = line.trim().to_ascii_lowercase();
    let input = match word.as_str() {
        "" => return None,
        "pause" | "p" => Input::Command(SessionCommand::Pause),
        "resume" | "r" => Input::Command(SessionCommand::Resume),
        "reset" => Input::Command(SessionCommand::Reset),
        "complete" | "done" => Input::Command(SessionCommand::Complete),
        "quit" | "q" | "exit" => Input::Command(SessionCommand::Shutdown),
        "hide" => Input::Signal(AttentionSignal::TabHidden),
        "show" => Input::Signal(AttentionSignal::TabVisible),
        "blur" => Input::Signal(AttentionSignal::WindowBlur),
        "focus" => Input::Signal(AttentionSignal::WindowFocus),
        "bg" => Input::Signal(AttentionSignal::AppBackground),
        "fg" => Input::Signal(AttentionSignal::AppForeground),
        "idle" => Input::Signal(AttentionSignal::Idle),
        "help" | "?" => Input::Help,
        _ => Input::Unknown(word),
    };
    Some(input)
}

pub const HELP: &str = "commands: pause, resume, reset, complete, quit\n\
signals:  hide/show (tab), blur/focus (window), bg/fg (app), idle";

fn read_terminal(handle: SessionHandle, signals: AttentionSender) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let delivered = match parse_input(&line) {
            None => true,
            Some(Input::Command(command)) => handle.blocking_send(command),
            Some(Input::Signal(signal)) => signals.send(signal),
            Some(Input::Help) => {
                println!("{}", HELP);
                true
            }
            Some(Input::Unknown(word)) => {
                println!("unknown input '{}'; type 'help'", word);
                true
            }
        };
        if !delivered {
            break;
        }
    }
    // End of input stops the session like `quit`
    handle.blocking_send(SessionCommand::Shutdown);
}

/// Run one session until it completes, is reset, or the user quits.
pub async fn run_session(
    controller: SessionController,
    user: Option<AuthUser>,
    goal: String,
    minutes: u32,
) -> Result<()> {
    let (signals, source) = attention_channel();
    let (runner, handle, mut events) = SessionRunner::new(controller, source);
    let runner = tokio::spawn(runner.run());

    handle.start(user, goal, minutes).await;

    let reader_handle = handle.clone();
    std::thread::spawn(move || read_terminal(reader_handle, signals));

    let mut started = false;
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Started(session) => {
                started = true;
                render::session_started(&session);
                println!("{}", HELP);
            }
            SessionEvent::Tick { remaining_seconds, display } => {
                render::tick(&display, remaining_seconds, minutes);
            }
            SessionEvent::Paused => println!("\npaused"),
            SessionEvent::Resumed => println!("resumed"),
            SessionEvent::DistractionLogged(logged) => render::distraction(&logged),
            SessionEvent::Completed(report) => {
                render::completion(&report);
                handle.shutdown().await;
            }
            SessionEvent::Reset => {
                println!("\nsession reset; nothing was recorded");
                handle.shutdown().await;
            }
            SessionEvent::Error(message) => {
                eprintln!("\nerror: {}", message);
                if !started {
                    handle.shutdown().await;
                }
            }
        }
        std::io::stdout().flush().ok();
    }

    let controller = runner.await?;
    debug!(state = %controller.state(), "session finished");
    if controller.state().is_active() {
        println!("\nleft the session unfinished; it will show as incomplete");
    }
    Ok(())
}

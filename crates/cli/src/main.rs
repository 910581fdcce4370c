//! FocusForge CLI - focus sessions with distraction tracking.

mod config;
mod interactive;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use focusforge_core::AuthUser;
use focusforge_session::SessionController;
use focusforge_stats::StatsService;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{current_user, open_backend, CredentialStore, ForgeConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "focusforge")]
#[command(about = "Focus sessions with distraction tracking, XP and streaks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account on the hosted backend
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in to the hosted backend
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget saved credentials
    Logout,
    /// Run a focus session
    Start {
        /// What this session is for
        #[arg(long)]
        goal: String,
        /// Duration in minutes (defaults to the configured duration)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Summary cards, progress goals, weekly chart and badges
    Dashboard,
    /// Completed sessions per day this week
    Calendar,
    /// Session history and distraction log
    Log,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn require_user(user: Option<AuthUser>) -> Result<AuthUser> {
    user.context("not logged in; run `focusforge login --email <EMAIL> --password <PASSWORD>`")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ForgeConfig::load(&cli.config)?;
    let store = CredentialStore::beside(&cli.config);

    if let Commands::Logout = cli.command {
        if store.clear()? {
            println!("Signed out ({} removed)", store.path().display());
        } else {
            println!("Not signed in");
        }
        return Ok(());
    }

    let backends = open_backend(&config).await?;

    match cli.command {
        Commands::Signup { email, password } => {
            let rest = backends
                .rest
                .context("sign-up needs the hosted backend; set FOCUSFORGE_URL")?;
            let user = rest.sign_up(&email, &password).await?;
            if user.access_token.is_some() {
                store.save(&user)?;
                println!("Account created. Signed in as {}", email);
            } else {
                println!("Account created. Check {} to confirm, then log in.", email);
            }
        }
        Commands::Login { email, password } => {
            let rest = backends
                .rest
                .context("login needs the hosted backend; set FOCUSFORGE_URL")?;
            let user = rest.sign_in(&email, &password).await?;
            store.save(&user)?;
            println!("Signed in as {}", email);
        }
        Commands::Logout => {}
        Commands::Start { goal, minutes } => {
            let user = current_user(&config, &store)?;
            let minutes = minutes.unwrap_or(config.session.default_duration_minutes);
            info!(minutes, "starting focus session");

            let controller =
                SessionController::new(backends.data.clone()).with_config(config.session.clone());
            interactive::run_session(controller, user, goal, minutes).await?;
        }
        Commands::Dashboard => {
            let user = require_user(current_user(&config, &store)?)?;
            let stats = StatsService::new(backends.data).dashboard(&user).await?;
            render::dashboard(&stats);
        }
        Commands::Calendar => {
            let user = require_user(current_user(&config, &store)?)?;
            let buckets = StatsService::new(backends.data).calendar(&user).await?;
            render::calendar(&buckets);
        }
        Commands::Log => {
            let user = require_user(current_user(&config, &store)?)?;
            let log = StatsService::new(backends.data).distraction_log(&user).await?;
            render::history(&log);
        }
    }

    Ok(())
}

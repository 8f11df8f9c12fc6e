// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ncctl - Nextcloud from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in through the browser and print an app password
//! ncctl --server https://cloud.example.com login
//!
//! # Resume waiting on a login that timed out
//! ncctl login --token <poll-token>
//!
//! # Query capabilities
//! ncctl --user alice capabilities spreed.features --format json
//!
//! # Conversation avatars
//! ncctl avatar emoji abc123 🚀 --color ff0000
//! ncctl avatar get abc123 --dark --output avatar.png
//!
//! # Remote wipe status
//! ncctl wipe check
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nextcloud_api::LoginFlowError;
use nextcloud_fetch::FetchError;
use nextcloud_store::{LogLevel, SettingsStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{avatar, capabilities, config, login, wipe};

// ============================================================================
// CLI Definition
// ============================================================================

/// ncctl - Nextcloud command-line client.
#[derive(Parser)]
#[command(name = "ncctl")]
#[command(about = "Nextcloud command-line client")]
#[command(long_about = r#"
ncctl talks to a Nextcloud server: browser login (login flow v2),
capabilities, Talk conversation avatars and remote wipe.

Passwords are never saved. Pass the app password printed by `ncctl login`
with --password or the NEXTCLOUD_PASSWORD environment variable.

Examples:
  ncctl --server https://cloud.example.com login
  ncctl capabilities spreed.features
  ncctl avatar emoji abc123 🚀 --color ff0000
  ncctl wipe check
  ncctl config set poll_interval_secs 2
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL. Defaults to the saved `server` setting.
    #[arg(long, short, env = "NEXTCLOUD_SERVER", global = true)]
    pub server: Option<String>,

    /// Login name. Defaults to the saved `username` setting.
    #[arg(long, short, env = "NEXTCLOUD_USER", global = true)]
    pub user: Option<String>,

    /// Password or app password.
    #[arg(long, env = "NEXTCLOUD_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Settings file to use instead of the default.
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, errors only as exit codes).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in through the browser and print an app password.
    Login(login::LoginArgs),

    /// Revoke the app password used for this call.
    Logout,

    /// Show server capabilities.
    #[command(visible_alias = "caps")]
    Capabilities(capabilities::CapabilitiesArgs),

    /// Manage Talk conversation avatars.
    Avatar(avatar::AvatarArgs),

    /// Check or acknowledge a remote wipe.
    Wipe(wipe::WipeArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The server lacks a required capability.
    NotCapable = 2,
    /// The server rejected the credentials.
    Unauthorized = 3,
    /// Login was not confirmed in time.
    Timeout = 4,
    /// Interrupted with Ctrl-C.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(login) = err.downcast_ref::<LoginFlowError>() {
            return match login {
                LoginFlowError::Timeout { .. } => Self::Timeout,
                LoginFlowError::Cancelled { .. } => Self::Cancelled,
                LoginFlowError::Fetch(fetch) => Self::for_fetch(fetch),
                _ => Self::Error,
            };
        }
        err.downcast_ref::<FetchError>()
            .map_or(Self::Error, Self::for_fetch)
    }

    fn for_fetch(err: &FetchError) -> Self {
        if err.is_not_capable() {
            Self::NotCapable
        } else if err.api_error().and_then(|e| e.status_code()) == Some(401) {
            Self::Unauthorized
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("nextcloud=debug,ncctl=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("nextcloud={level},ncctl={level},warn")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match &cli.settings {
        Some(path) => SettingsStore::load(path.clone()).await,
        None => SettingsStore::load_default().await,
    };
    setup_logging(cli.verbose, cli.quiet, store.get().await.log_level);

    let result = match &cli.command {
        Commands::Login(args) => login::run(args, &cli, &store).await,
        Commands::Logout => login::logout(&cli, &store).await,
        Commands::Capabilities(args) => capabilities::run(args, &cli, &store).await,
        Commands::Avatar(args) => avatar::run(args, &cli, &store).await,
        Commands::Wipe(args) => wipe::run(args, &cli, &store).await,
        Commands::Config(args) => config::run(args, &cli, &store).await,
    };

    if let Err(e) = result {
        let code = ExitCode::for_error(&e);
        match cli.format {
            OutputFormat::Json => {
                println!("{}", output::JsonFormatter::new(cli.pretty).format_error(&e, code)?);
            }
            OutputFormat::Text if !cli.quiet => eprintln!("Error: {e:#}"),
            OutputFormat::Text => {}
        }
        std::process::exit(code as i32);
    }

    Ok(())
}

//! Journal service entry point.

mod server;

use std::ffi::OsString;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use journal::settings::{JournalSettings, LogFormat};

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "journal",
    about = "Travel journal service: accounts, entries and photo uploads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Serve the HTTP API (the default).
    Serve {
        /// Listening port; overrides JOURNAL_PORT and PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit.
    Migrate,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Plain => fmt().with_env_filter(filter).try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Settings come from JOURNAL_* variables and config files; the command
    // line belongs to clap above.
    let settings = JournalSettings::load_from_iter([OsString::from("journal")])
        .wrap_err("failed to load settings")?;
    init_tracing(settings.log_format()?);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => server::serve(settings, port).await,
        Command::Migrate => server::migrate(&settings).await,
    }
}

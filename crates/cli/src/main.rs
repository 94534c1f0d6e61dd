//! carelink CLI - patient scheduling from the terminal

mod commands;
mod config;
mod logging;
mod state_dir;

use anyhow::Result;
use carelink_core::FileCredentialStore;
use carelink_http::CareClient;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use state_dir::StateDir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "carelink")]
#[command(about = "Find providers and manage appointments with the care scheduling service")]
#[command(version)]
struct Cli {
    /// Client configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true, env = "CARELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for credentials, logs and the user config file
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Also write logs to carelink.log in the data directory
    #[arg(long, global = true)]
    file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state = StateDir::resolve(cli.data_dir.clone());
    let log_file = cli.file_log.then(|| state.log_file());
    logging::init_logging(cli.log_level.into(), log_file.as_deref())?;

    let ctx = match build_context(&cli, &state) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Startup failed: {e:#}");
            std::process::exit(1);
        }
    };
    debug!(base_url = %ctx.config.base_url, "carelink ready");

    // Execute command with optional timeout
    let outcome = if cli.timeout == 0 {
        cli.command.execute(&ctx).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&ctx)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn build_context(cli: &Cli, state: &StateDir) -> Result<Context> {
    let config = config::load_client_config(
        cli.config.as_deref(),
        &state.user_config_file(),
        cli.base_url.clone(),
    )?;

    let store = Arc::new(FileCredentialStore::in_dir(state.data_dir()));
    debug!(path = %store.path().display(), "using credential file");

    let client = CareClient::from_config(&config)
        .credential_store(store)
        .build()?;

    Ok(Context { client, config })
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

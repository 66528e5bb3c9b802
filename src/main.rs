#![forbid(unsafe_code)]

//! `buildboard` — submission workflow service binary.
//!
//! Bootstraps configuration and persistence, recovers the build queue and
//! reward ledger from their snapshots, and runs the completion-signal
//! poller until shutdown. The chat-facing host layer drives the intake
//! and review engines through the library surface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use buildboard::collab::default_impls::LogNotifier;
use buildboard::completion::{spawn_poll_task, CompletionIntake};
use buildboard::config::GlobalConfig;
use buildboard::persistence::db;
use buildboard::persistence::queue_repo::QueueRepo;
use buildboard::persistence::signal_repo::SignalRepo;
use buildboard::persistence::ticket_repo::TicketRepo;
use buildboard::queue::BuildQueue;
use buildboard::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "buildboard", about = "Submission workflow service", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("buildboard service bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = Arc::new(GlobalConfig::load_from_path(&args.config)?);
    info!("configuration loaded");

    let database = Arc::new(db::connect(config.db_path()).await?);
    info!("database connected");

    let queue = Arc::new(BuildQueue::recover(QueueRepo::new(Arc::clone(&database))).await?);
    info!("queue state recovered");

    let completion = Arc::new(CompletionIntake::new(
        Arc::clone(&config),
        SignalRepo::new(Arc::clone(&database)),
        TicketRepo::new(Arc::clone(&database)),
        Arc::clone(&queue),
        Arc::new(LogNotifier),
    ));

    let cancel = CancellationToken::new();
    let poll_handle = spawn_poll_task(
        Arc::clone(&completion),
        Duration::from_secs(config.completion_poll_seconds),
        cancel.clone(),
    );
    info!("completion poller started");

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::Io(format!("failed to listen for shutdown signal: {err}")))?;
    info!("shutdown signal received");

    cancel.cancel();
    if let Err(err) = poll_handle.await {
        warn!(%err, "completion poller did not shut down cleanly");
    }

    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))
}

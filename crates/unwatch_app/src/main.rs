mod config;
mod tab;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine_logging::{engine_info, LogDestination};
use log::LevelFilter;
use unwatch_engine::{
    poll_until_idle, CheckpointStore, FileCheckpointStore, HttpItemRemover, HttpPageLoader,
    PollOutcome, RunEnd,
};

use config::AppConfig;
use tab::{Tab, TabMode};

#[derive(Debug, Parser)]
#[command(
    name = "unwatch",
    about = "Remove every watch from a paginated listing, resuming across page loads"
)]
struct Cli {
    /// RON configuration file.
    #[arg(long, short, default_value = "unwatch.ron")]
    config: PathBuf,
    /// Overrides `state_dir` from the configuration.
    #[arg(long)]
    state_dir: Option<PathBuf>,
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Remove watches page by page.
    Run {
        /// First page to load; defaults to the listing URL.
        #[arg(long)]
        url: Option<String>,
        /// Only continue a stored task instead of starting a fresh one.
        #[arg(long)]
        resume: bool,
    },
    /// Print the stored checkpoint.
    Status,
    /// Forget the stored checkpoint.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match config.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level);

    let store = FileCheckpointStore::new(config.state_dir.clone());
    match cli.command {
        Command::Run { url, resume } => run(&config, store, url, resume).await,
        Command::Status => {
            let checkpoint = store.load().context("reading checkpoint")?;
            if checkpoint.active {
                println!(
                    "task in progress: {} removed, last page {}",
                    checkpoint.total_processed,
                    checkpoint.last_location.as_deref().unwrap_or("(none)")
                );
            } else {
                println!("no task in progress");
            }
            Ok(())
        }
        Command::Clear => {
            store.clear().context("clearing checkpoint")?;
            println!("checkpoint cleared");
            Ok(())
        }
    }
}

async fn run(
    config: &AppConfig,
    store: FileCheckpointStore,
    url: Option<String>,
    resume: bool,
) -> anyhow::Result<()> {
    let fetch = config.fetch_settings();
    let tab = Arc::new(Tab::new(
        HttpPageLoader::new(fetch.clone())?,
        HttpItemRemover::new(&fetch)?,
        store,
        config.policy()?,
        config.selectors(),
        config.runner_settings(),
    ));

    let location = url.unwrap_or_else(|| config.listing_url.clone());
    let mode = if resume { TabMode::Resume } else { TabMode::Start };
    engine_info!("Starting at {} ({:?})", location, mode);

    let status = tab.status_handle();
    let task = tab.spawn(location, mode);

    match poll_until_idle(&status, config.status_interval(), config.status_cap()).await {
        PollOutcome::Finished { .. } => match task.await.context("tab task panicked")?? {
            RunEnd::Completed { total } => println!("done: {total} watches removed"),
            RunEnd::Aborted { total, error } => {
                println!("stopped after {total} watches removed: {error}")
            }
            RunEnd::Abandoned { total, error } => {
                println!("did not resume ({total} watches removed earlier): {error}")
            }
            RunEnd::Idle => println!("nothing to do"),
            RunEnd::Navigated { to } => println!("left off at {to}"),
        },
        PollOutcome::PresumedComplete { last_total } => {
            println!(
                "no result after {:?}; presumed complete ({last_total} watches removed so far)",
                config.status_cap()
            );
            task.abort();
        }
    }
    Ok(())
}

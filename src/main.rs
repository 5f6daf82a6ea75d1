//! Hostwatch command line
//!
//! `hostwatch collect` runs the collector until Ctrl-C. The other subcommands read the
//! store and print a JSON response on stdout. Logs go to stderr, filtered by `RUST_LOG`
//! (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hostwatch::collector::{spawn_shutdown_listener, Collector};
use hostwatch::config::{Config, ConfigLoader};
use hostwatch::query::QueryEngine;
use hostwatch::sampler::SystemSource;
use hostwatch::service::{QueryService, Response};
use hostwatch::store::SeriesStore;
use hostwatch::Result;

#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(about = "Host health collector and query tool")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ./hostwatch.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample the host at the configured interval until interrupted
    Collect,

    /// Latest sample with its alerts
    Current,

    /// Samples from the last N hours
    History {
        /// Window length in hours
        #[arg(long, default_value_t = 1)]
        hours: u32,
    },

    /// CPU, RAM and disk statistics over the last hour
    Stats,

    /// Write the whole series to a JSON file
    Export {
        /// Destination file
        path: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn query_service(config: &Config) -> QueryService {
    let store = Arc::new(SeriesStore::new(config.log_dir.clone()));
    QueryService::new(store, QueryEngine::new(config.thresholds))
}

async fn collect(config: &Config) -> Result<()> {
    let store = SeriesStore::open(config.log_dir.clone())?.with_plain_log(config.plain_log);
    let source = SystemSource::new(config.disk_mount.clone());
    let mut collector = Collector::from_config(source, Arc::new(store), config);

    let shutdown = spawn_shutdown_listener(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    });
    let summary = collector.run(shutdown).await;

    info!(ticks = summary.ticks(), "collection finished");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;

    match cli.command {
        Command::Collect => collect(&config).await,
        Command::Current => print_json(&query_service(&config).current()),
        Command::History { hours } => print_json(&query_service(&config).history(hours)),
        Command::Stats => print_json(&query_service(&config).stats()),
        Command::Export { path } => {
            let store = SeriesStore::new(config.log_dir.clone());
            let count = store.export_snapshot(&path)?;
            info!(records = count, path = %path.display(), "series exported");
            print_json(&Response::success(serde_json::json!({ "exported": count, "path": path })))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "hostwatch failed");
            ExitCode::FAILURE
        }
    }
}

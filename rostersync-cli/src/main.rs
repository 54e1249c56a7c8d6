//! rostersync
//!
//! Pulls the player roster of one universe and every player's detail record
//! from the public XML API, and reconciles them into a DynamoDB table.
//!
//! Usage:
//!   rostersync --universe 166 --table-name PlayerData
//!   rostersync --interval-secs 3600
//!
//! Exit codes: 0 clean pass, 1 fatal error, 2 pass left writes unprocessed.

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rostersync_cli::{Args, PassOutcome, build_store, run_pass, run_periodic};
use rostersync_source::XmlApiSource;
use rostersync_sync::Reconciler;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let code = run(args).await?;
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let config = args.sync_config().context("invalid configuration")?;
    let source = XmlApiSource::new(args.source_config()).context("failed to build source")?;
    let store = build_store(&args, config.limits)
        .await
        .context("failed to connect to the store")?;

    info!(
        "rostersync starting: universe {} -> {} ({} store, concurrency {})",
        config.universe,
        config.table_name,
        store.provider_name(),
        config.fetch_concurrency
    );
    let reconciler =
        Reconciler::new(Arc::new(source), store, config).context("invalid configuration")?;

    match args.interval_secs {
        None => Ok(run_pass(&reconciler).await.code()),
        Some(secs) => {
            ensure!(secs > 0, "--interval-secs must be at least 1");
            run_periodic(&reconciler, Duration::from_secs(secs), tokio::signal::ctrl_c()).await;
            Ok(PassOutcome::Clean.code())
        }
    }
}

//! Argument handling and pass orchestration for the `rostersync` binary.

use clap::Parser;
use rostersync_dynamo::{DynamoConfig, DynamoStore};
use rostersync_source::{DEFAULT_COMMUNITY, SourceConfig};
use rostersync_sync::{
    BatchLimits, BatchStore, MemoryStore, Reconciler, SyncConfig, SyncReport, SyncResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[derive(Parser, Debug, Clone)]
#[command(name = "rostersync")]
#[command(about = "Reconciles a universe's player roster into a DynamoDB table")]
pub struct Args {
    /// Table holding the detail records
    #[arg(long, env = "TABLE_NAME", default_value = "PlayerData")]
    pub table_name: String,

    /// Universe to synchronize
    #[arg(short, long, env = "UNIVERSE", default_value = "166")]
    pub universe: u32,

    /// Community code of the public API host
    #[arg(long, default_value = DEFAULT_COMMUNITY)]
    pub community: String,

    /// Override the API base URL
    #[arg(long)]
    pub source_url: Option<String>,

    /// Per-request timeout of the source client, in seconds
    #[arg(long, default_value = "30")]
    pub source_timeout_secs: u64,

    /// Maximum concurrent detail fetches
    #[arg(short, long, default_value = "3")]
    pub concurrency: usize,

    /// Maximum items per write batch
    #[arg(long, default_value = "25")]
    pub write_limit: usize,

    /// Maximum keys per read batch
    #[arg(long, default_value = "100")]
    pub read_limit: usize,

    /// Pause between read batches, in milliseconds
    #[arg(long, default_value = "200")]
    pub read_pause_ms: u64,

    /// AWS region override
    #[arg(long)]
    pub region: Option<String>,

    /// DynamoDB endpoint override (e.g. DynamoDB Local)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Run a pass every N seconds instead of once
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Use an in-memory store instead of DynamoDB
    #[arg(long)]
    pub dry_store: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds and validates the engine configuration.
    pub fn sync_config(&self) -> SyncResult<SyncConfig> {
        let config = SyncConfig {
            table_name: self.table_name.clone(),
            universe: self.universe,
            fetch_concurrency: self.concurrency,
            limits: BatchLimits::new(self.write_limit, self.read_limit)?,
            read_pause_ms: self.read_pause_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            base_url: self.source_url.clone(),
            community: self.community.clone(),
            timeout_secs: self.source_timeout_secs,
        }
    }

    pub fn dynamo_config(&self) -> DynamoConfig {
        DynamoConfig {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Builds the store selected by the arguments. A DynamoDB store whose
/// region or credentials cannot be resolved is a configuration error.
pub async fn build_store(args: &Args, limits: BatchLimits) -> SyncResult<Arc<dyn BatchStore>> {
    if args.dry_store {
        info!("Using in-memory store; nothing is persisted");
        Ok(Arc::new(MemoryStore::with_limits(limits)))
    } else {
        Ok(Arc::new(DynamoStore::connect(&args.dynamo_config()).await?))
    }
}

/// How a pass ended, as far as the process exit status is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every write was processed.
    Clean,
    /// The pass aborted before writing anything.
    Fatal,
    /// The pass ran to completion but left writes unprocessed or failed.
    Incomplete,
}

impl PassOutcome {
    /// Classifies the result of [`Reconciler::run`].
    pub fn of(result: &SyncResult<SyncReport>) -> Self {
        match result {
            Ok(report) if report.is_complete() => PassOutcome::Clean,
            Ok(_) => PassOutcome::Incomplete,
            Err(_) => PassOutcome::Fatal,
        }
    }

    /// Process exit code.
    pub fn code(self) -> i32 {
        match self {
            PassOutcome::Clean => 0,
            PassOutcome::Fatal => 1,
            PassOutcome::Incomplete => 2,
        }
    }
}

/// Runs one pass and logs its result.
pub async fn run_pass(reconciler: &Reconciler) -> PassOutcome {
    let result = reconciler.run().await;
    match &result {
        Ok(report) => {
            if !report.fetch_failures.is_empty() {
                warn!(
                    "{} players could not be fetched and were left out",
                    report.fetch_failures.len()
                );
            }
            if report.unread_count() > 0 {
                warn!(
                    "{} existing records could not be read; their stale rows were not purged",
                    report.unread_count()
                );
            }
            if let Err(e) = report.ensure_complete() {
                warn!("{}", e);
            }
        }
        Err(e) => error!("Sync pass aborted: {}", e),
    }
    PassOutcome::of(&result)
}

/// Runs a pass on every tick until `shutdown` resolves. The shutdown future
/// is created once and outlives every pass, so a request that arrives while
/// a pass is running is honored as soon as that pass completes.
pub async fn run_periodic<F: Future>(reconciler: &Reconciler, period: Duration, shutdown: F) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    info!("Running a pass every {:?}", period);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            _ = ticker.tick() => {
                let outcome = run_pass(reconciler).await;
                info!("Pass finished with exit status {}", outcome.code());
            }
        }
    }
}

//! Market scanner - replays and watches snapshot documents
//!
//! Main entry point for running the opportunity engine over captured markets

mod settings;
mod source;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use market_core::{OpportunityRecord, OpportunitySet};
use market_detector::{select_best, OpportunityEngine, SelectionCriteria};
use market_history::SharedHistory;

use crate::watcher::Watcher;

#[derive(Parser, Debug)]
#[command(version, about = "Detect trading opportunities in captured currency market snapshots")]
struct Cli {
    /// Engine configuration file (optional)
    #[arg(long, default_value = "market-scan.toml")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a single snapshot document
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Feed every snapshot in a directory through one history, oldest first
    Replay { dir: PathBuf },
    /// Poll a directory and analyze new snapshots as they land
    Watch {
        dir: PathBuf,
        /// Delay between directory scans
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct SelectionArgs {
    /// Minimum confidence score for a pick (0-1)
    #[arg(long, default_value_t = 0.7)]
    min_confidence: f64,

    /// Minimum volume for a pick
    #[arg(long, default_value_t = 100)]
    min_volume: u64,
}

impl From<SelectionArgs> for SelectionCriteria {
    fn from(args: SelectionArgs) -> Self {
        Self {
            min_confidence: args.min_confidence,
            min_volume: args.min_volume,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("Starting market scanner v{}", env!("CARGO_PKG_VERSION"));

    let config = settings::load_engine_config(&cli.config)?;
    let engine = OpportunityEngine::new(config)?;

    match cli.command {
        Command::Analyze { file, selection } => analyze(&engine, &file, selection.into()),
        Command::Replay { dir } => replay(&engine, &dir),
        Command::Watch {
            dir,
            interval_ms,
            selection,
        } => watch(engine, &dir, Duration::from_millis(interval_ms), selection.into()).await,
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn analyze(engine: &OpportunityEngine, file: &Path, criteria: SelectionCriteria) -> anyhow::Result<()> {
    let snapshot = source::load_snapshot(file)?;
    let mut history = engine.new_history();

    info!(
        want = %snapshot.want_currency,
        have = %snapshot.have_currency,
        market_ratio = %snapshot.market_ratio,
        available = snapshot.available_quotes.len(),
        competing = snapshot.competing_quotes.len(),
        "Loaded snapshot"
    );

    let opportunities = engine.analyze(&snapshot, &mut history);
    log_pick(&opportunities, &criteria);
    print_json(&opportunities)
}

fn replay(engine: &OpportunityEngine, dir: &Path) -> anyhow::Result<()> {
    let files = source::snapshot_files(dir)?;
    info!("Replaying {} snapshot files from {}", files.len(), dir.display());

    let mut history = engine.new_history();
    let mut last = OpportunitySet::default();
    let mut failed = 0usize;

    for path in &files {
        let snapshot = match source::load_snapshot(path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        last = engine.analyze(&snapshot, &mut history);
        println!(
            "{}: {} opportunities (basic={}, triangle={}, market_making={})",
            path.display(),
            last.len(),
            last.basic.len(),
            last.triangle.len(),
            last.market_making.len()
        );
    }

    let stats = engine.stats(&history);
    info!(
        files = files.len(),
        failed,
        pairs = stats.pair_count,
        entries = stats.entry_count,
        currencies = stats.currency_count,
        "Replay complete"
    );

    print_json(&last)
}

async fn watch(
    engine: OpportunityEngine,
    dir: &Path,
    interval: Duration,
    criteria: SelectionCriteria,
) -> anyhow::Result<()> {
    info!("Watching {} every {:?}", dir.display(), interval);

    let engine = Arc::new(engine);
    let history = SharedHistory::from_config(engine.config());
    let mut watcher = Watcher::default();
    let mut ticker = tokio::time::interval(interval);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Triangle search is CPU-bound; keep it off the async workers
                let batch = {
                    let engine = Arc::clone(&engine);
                    let history = history.clone();
                    let dir = dir.to_path_buf();
                    let mut watcher = std::mem::take(&mut watcher);
                    move || {
                        let result = watcher.tick(&engine, &dir, &history, |_, opportunities| {
                            log_pick(opportunities, &criteria)
                        });
                        (watcher, result)
                    }
                };

                let (returned, result) = tokio::task::spawn_blocking(batch)
                    .await
                    .context("snapshot batch panicked")?;
                watcher = returned;

                match result {
                    Ok(summary) if summary.analyzed + summary.pending + summary.abandoned > 0 => {
                        debug!(
                            analyzed = summary.analyzed,
                            pending = summary.pending,
                            abandoned = summary.abandoned,
                            "Watch tick"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!("Directory scan failed: {:#}", e),
                }
            }
            _ = &mut shutdown => {
                info!("Watcher shutdown requested");
                break;
            }
        }
    }

    let stats = history.stats();
    info!(
        files = watcher.seen(),
        pairs = stats.pair_count,
        entries = stats.entry_count,
        "Watcher stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        }
        _ = terminate => {
            info!("Received termination signal");
        }
    }
}

fn log_pick(opportunities: &OpportunitySet, criteria: &SelectionCriteria) {
    match select_best(opportunities, criteria) {
        Some(record) => info!(
            strategy = record.label(),
            confidence = record.confidence(),
            volume = record.volume(),
            "Best opportunity: {}",
            describe(&record)
        ),
        None => info!(
            found = opportunities.len(),
            min_confidence = criteria.min_confidence,
            "No opportunity meets selection criteria"
        ),
    }
}

fn describe(record: &OpportunityRecord) -> String {
    match record {
        OpportunityRecord::Basic(o) => format!(
            "buy {} at {}, sell {} at {} ({:.2}% profit)",
            o.buy_currency,
            o.buy_ratio,
            o.sell_currency,
            o.sell_ratio,
            o.profit_fraction * 100.0
        ),
        OpportunityRecord::Triangle(o) => format!(
            "{} ({:.2}% profit)",
            o.path().join(" -> "),
            o.total_profit_fraction * 100.0
        ),
        OpportunityRecord::MarketMaking(o) => format!(
            "{} bid {} ask {} ({:.2}% spread)",
            o.pair,
            o.bid,
            o.ask,
            o.spread_fraction * 100.0
        ),
    }
}

fn print_json(opportunities: &OpportunitySet) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(opportunities).context("failed to serialize opportunities")?;
    println!("{json}");
    Ok(())
}

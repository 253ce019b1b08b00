//! hauler: reduce a market order snapshot to best-offer quotes and
//! profitable hub-to-hub trade pairs.
//!
//! Batch pipeline, one pass per invocation:
//! snapshot → quotes (`quotes.csv`) → trade pairs (`trade_pairs.csv`).

mod report;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hauler_analysis::{generate_pairs, reduce_quotes, HistoryIndex};
use hauler_core::{Config, Error};
use hauler_ingestion::{fetch_historical_stats, parse_orders, SnapshotCache, SnapshotClient};

#[derive(Parser)]
#[command(
    name = "hauler",
    about = "Find profitable hub-to-hub trades in a market order snapshot"
)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the order snapshot from a local CSV instead of downloading.
    #[arg(long)]
    orders_file: Option<PathBuf>,

    /// Skip historical enrichment of trade pairs.
    #[arg(long)]
    skip_history: bool,

    /// Supply depth margin (fraction above the best price).
    #[arg(long)]
    depth_margin: Option<f64>,

    /// Minimum profit margin for a pair to be kept.
    #[arg(long)]
    margin_threshold: Option<f64>,

    /// Cache directory for downloaded snapshots.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Output directory for the CSV artifacts.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Cache freshness TTL in minutes.
    #[arg(long)]
    cache_max_age_minutes: Option<i64>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(depth_margin) = cli.depth_margin {
        config.reducer.depth_margin = depth_margin;
    }
    if let Some(margin_threshold) = cli.margin_threshold {
        config.pairs.margin_threshold = margin_threshold;
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.ingestion.cache_dir = cache_dir.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.ingestion.output_dir = output_dir.clone();
    }
    if let Some(minutes) = cli.cache_max_age_minutes {
        config.ingestion.cache_max_age_minutes = minutes;
    }

    config.validate()?;
    Ok(config)
}

/// Acquire the raw order snapshot: local file, fresh cache, then download.
///
/// When every source fails this returns `Error::NoMarketData` — the one
/// condition the pipeline treats as a hard failure.
async fn acquire_orders(
    cli: &Cli,
    config: &Config,
    client: &SnapshotClient,
    cache: &SnapshotCache,
) -> hauler_core::Result<String> {
    if let Some(path) = &cli.orders_file {
        info!(path = %path.display(), "reading order snapshot from file");
        return std::fs::read_to_string(path).map_err(|err| {
            warn!(path = %path.display(), %err, "order snapshot file unreadable");
            Error::NoMarketData
        });
    }

    let now = Utc::now();
    if let Some(body) = cache.load("market_orders", now) {
        info!("using cached order snapshot");
        return Ok(body);
    }

    match client.fetch_bz2(&config.ingestion.market_orders_url).await {
        Ok(body) => {
            if let Err(err) = cache.store("market_orders", &body, now) {
                warn!(%err, "failed to cache order snapshot");
            }
            Ok(body)
        }
        Err(err) => {
            warn!(%err, "order snapshot download failed");
            Err(Error::NoMarketData)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let hubs = config.hub_set();
    let started = Instant::now();

    let client = SnapshotClient::new();
    let cache = SnapshotCache::new(
        &config.ingestion.cache_dir,
        config.ingestion.cache_max_age_minutes,
    );

    let snapshot = acquire_orders(&cli, &config, &client, &cache).await?;
    let (orders, parse_stats) = parse_orders(&snapshot);
    if parse_stats.malformed > 0 {
        warn!(skipped = parse_stats.malformed, "skipped malformed order rows");
    }
    info!(orders = orders.len(), "parsed order snapshot");

    let (quotes, reduce_stats) = reduce_quotes(&orders, &hubs, config.reducer.depth_margin);
    if reduce_stats.invalid_price_dropped > 0 {
        warn!(
            skipped = reduce_stats.invalid_price_dropped,
            "skipped orders with invalid prices"
        );
    }
    info!(
        quotes = quotes.len(),
        buy_orders = reduce_stats.buy_orders_dropped,
        foreign_hubs = reduce_stats.foreign_hub_dropped,
        single_hub_items = reduce_stats.single_hub_items_dropped,
        "reduced order snapshot to quotes"
    );

    let quotes_path = config.ingestion.output_dir.join("quotes.csv");
    report::write_quotes(&quotes_path, &quotes)?;
    info!(path = %quotes_path.display(), rows = quotes.len(), "wrote quote table");

    let history = if cli.skip_history {
        None
    } else {
        match fetch_historical_stats(&client, &config.ingestion, &hubs, Utc::now()).await {
            Ok(stats) => {
                info!(records = stats.len(), "loaded historical stats");
                Some(HistoryIndex::from_stats(stats))
            }
            Err(err) => {
                warn!(%err, "historical data unavailable, continuing without enrichment");
                None
            }
        }
    };

    let pairs = generate_pairs(&quotes, history.as_ref(), config.pairs.margin_threshold);
    let pairs_path = config.ingestion.output_dir.join("trade_pairs.csv");
    report::write_pairs(&pairs_path, &pairs)?;
    info!(
        path = %pairs_path.display(),
        rows = pairs.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote trade pair table"
    );

    Ok(())
}

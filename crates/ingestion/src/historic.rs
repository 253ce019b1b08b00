//! Weekly historical price/volume snapshots.
//!
//! The upstream publishes one semicolon-delimited CSV per ISO week for
//! station prices and another for station volumes. Both are fetched,
//! filtered to the configured hubs, and merged into `HistoricalStat`
//! records keyed by (item, hub, date).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use serde::Deserialize;
use tracing::{debug, info, warn};

use hauler_core::config::IngestionConfig;
use hauler_core::{Error, HistoricalStat, HubId, HubSet, ItemId, Result};

use crate::client::SnapshotClient;
use crate::orders::ParseStats;

/// A year/ISO-week pair identifying one weekly history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekStamp {
    pub year: i32,
    pub week: u32,
}

impl WeekStamp {
    /// The week whose files should exist as of `now`.
    ///
    /// Files for a week are published after it closes; early on Monday the
    /// current week's file may not be up yet, so step back one week.
    pub fn for_run(now: DateTime<Utc>) -> Self {
        let effective = if now.weekday() == Weekday::Mon && now.hour() < 12 {
            now - Duration::days(7)
        } else {
            now
        };
        let iso = effective.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// The ISO week before this one, crossing year boundaries correctly.
    pub fn previous(self) -> Self {
        match NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon) {
            Some(monday) => {
                let iso = (monday - Duration::days(7)).iso_week();
                Self {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            None => Self {
                year: self.year,
                week: self.week.saturating_sub(1).max(1),
            },
        }
    }

    /// File-name suffix, e.g. `2026-05`.
    pub fn file_suffix(&self) -> String {
        format!("{}-{:02}", self.year, self.week)
    }
}

/// URL of the weekly station price history file.
pub fn price_url(base: &str, stamp: WeekStamp) -> String {
    format!(
        "{base}/{}/MarketPricesStationHistory_hub_weekly_{}.csv",
        stamp.year,
        stamp.file_suffix()
    )
}

/// URL of the weekly station volume history file.
pub fn volume_url(base: &str, stamp: WeekStamp) -> String {
    format!(
        "{base}/{}/MarketVolumesStationHistory_hub_weekly_{}.csv",
        stamp.year,
        stamp.file_suffix()
    )
}

/// One row of the weekly price history file.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceHistoryRow {
    pub type_id: ItemId,
    pub location_id: HubId,
    pub date: NaiveDate,
    pub sell_price_low: f64,
    pub sell_price_avg: f64,
}

/// One row of the weekly volume history file.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeHistoryRow {
    pub type_id: ItemId,
    pub location_id: HubId,
    pub date: NaiveDate,
    pub sell_volume_avg: f64,
}

/// Parse the semicolon-delimited weekly price file, keeping configured hubs.
pub fn parse_price_history(csv_text: &str, hubs: &HubSet) -> (Vec<PriceHistoryRow>, ParseStats) {
    parse_history_rows(csv_text, hubs, |row: &PriceHistoryRow| row.location_id)
}

/// Parse the semicolon-delimited weekly volume file, keeping configured hubs.
pub fn parse_volume_history(csv_text: &str, hubs: &HubSet) -> (Vec<VolumeHistoryRow>, ParseStats) {
    parse_history_rows(csv_text, hubs, |row: &VolumeHistoryRow| row.location_id)
}

fn parse_history_rows<T>(
    csv_text: &str,
    hubs: &HubSet,
    location: impl Fn(&T) -> HubId,
) -> (Vec<T>, ParseStats)
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(csv_text.as_bytes());
    let mut stats = ParseStats::default();
    let mut rows = Vec::new();

    for result in reader.deserialize::<T>() {
        stats.rows += 1;
        match result {
            Ok(row) => {
                if hubs.contains(location(&row)) {
                    rows.push(row);
                    stats.parsed += 1;
                }
            }
            Err(err) => {
                debug!(row = stats.rows, %err, "skipping malformed history row");
                stats.malformed += 1;
            }
        }
    }

    (rows, stats)
}

/// Merge weekly price and volume rows into historical stats.
///
/// Inner join on (item, hub, date): a price row without a matching volume
/// row produces no record. Output is sorted by key for reproducibility.
pub fn merge_history(
    prices: Vec<PriceHistoryRow>,
    volumes: Vec<VolumeHistoryRow>,
) -> Vec<HistoricalStat> {
    let volume_by_key: HashMap<(ItemId, HubId, NaiveDate), f64> = volumes
        .into_iter()
        .map(|v| ((v.type_id, v.location_id, v.date), v.sell_volume_avg))
        .collect();

    let mut stats: Vec<HistoricalStat> = prices
        .into_iter()
        .filter_map(|p| {
            let avg_volume = *volume_by_key.get(&(p.type_id, p.location_id, p.date))?;
            Some(HistoricalStat {
                item_id: p.type_id,
                hub_id: p.location_id,
                date: p.date,
                low_price: p.sell_price_low,
                avg_price: p.sell_price_avg,
                avg_volume,
            })
        })
        .collect();

    stats.sort_by_key(|s| (s.item_id, s.hub_id, s.date));
    stats
}

/// Fetch and merge the weekly history for the current run.
///
/// Tries the current week's files first, then the previous week's when the
/// current ones are not yet published. Both files of a week must exist for
/// it to be used. Failure here is expected to be absorbed by the caller —
/// history is optional enrichment.
pub async fn fetch_historical_stats(
    client: &SnapshotClient,
    config: &IngestionConfig,
    hubs: &HubSet,
    now: DateTime<Utc>,
) -> Result<Vec<HistoricalStat>> {
    let current = WeekStamp::for_run(now);
    for stamp in [current, current.previous()] {
        let prices_body = client
            .fetch_text_optional(&price_url(&config.historic_prices_base_url, stamp))
            .await?;
        let volumes_body = client
            .fetch_text_optional(&volume_url(&config.historic_volumes_base_url, stamp))
            .await?;

        match (prices_body, volumes_body) {
            (Some(prices_body), Some(volumes_body)) => {
                let (prices, price_stats) = parse_price_history(&prices_body, hubs);
                let (volumes, volume_stats) = parse_volume_history(&volumes_body, hubs);
                if price_stats.malformed > 0 || volume_stats.malformed > 0 {
                    warn!(
                        prices = price_stats.malformed,
                        volumes = volume_stats.malformed,
                        "skipped malformed history rows"
                    );
                }
                info!(
                    week = %stamp.file_suffix(),
                    prices = prices.len(),
                    volumes = volumes.len(),
                    "loaded weekly history"
                );
                return Ok(merge_history(prices, volumes));
            }
            _ => {
                info!(week = %stamp.file_suffix(), "weekly history not published, trying previous week");
            }
        }
    }

    Err(Error::download(
        "no weekly history files available for the current or previous week",
    ))
}

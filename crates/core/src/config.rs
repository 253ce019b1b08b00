//! Configuration structures for the hauler pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Hub, HubSet};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trading hub configuration.
    pub hubs: HubsConfig,
    /// Quote reduction configuration.
    pub reducer: ReducerConfig,
    /// Trade pair generation configuration.
    pub pairs: PairsConfig,
    /// Snapshot acquisition configuration.
    pub ingestion: IngestionConfig,
}

impl Config {
    /// Check that the configuration describes a runnable pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.hubs.hubs.len() < 2 {
            return Err(Error::config("at least two trade hubs are required"));
        }
        let distinct = self.hub_set().distinct_len();
        if distinct < 2 {
            return Err(Error::config("trade hub ids must include at least two distinct stations"));
        }
        if !self.reducer.depth_margin.is_finite() || self.reducer.depth_margin < 0.0 {
            return Err(Error::config("depth_margin must be a non-negative number"));
        }
        if !self.pairs.margin_threshold.is_finite() {
            return Err(Error::config("margin_threshold must be a finite number"));
        }
        if self.ingestion.cache_max_age_minutes < 0 {
            return Err(Error::config("cache_max_age_minutes must not be negative"));
        }
        Ok(())
    }

    /// The configured hubs as a `HubSet`.
    pub fn hub_set(&self) -> HubSet {
        HubSet::new(self.hubs.hubs.clone())
    }
}

/// Trading hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubsConfig {
    /// Stations considered by the pipeline. Any count >= 2 is supported.
    pub hubs: Vec<Hub>,
}

impl Default for HubsConfig {
    fn default() -> Self {
        Self {
            hubs: vec![
                Hub::new(60003760, "Jita"),
                Hub::new(60008494, "Amarr"),
                Hub::new(60004588, "Rens"),
                Hub::new(60005686, "Hek"),
                Hub::new(60011866, "Dodixie"),
            ],
        }
    }
}

/// Quote reduction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Band above the best price (as a fraction) whose orders count
    /// toward supply.
    pub depth_margin: f64,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self { depth_margin: 0.10 }
    }
}

/// Trade pair generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairsConfig {
    /// Minimum directional profit margin for a pair to be retained.
    pub margin_threshold: f64,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self { margin_threshold: 0.10 }
    }
}

/// Snapshot acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// URL of the bz2-compressed market order snapshot.
    pub market_orders_url: String,
    /// Base URL of the weekly station price history files.
    pub historic_prices_base_url: String,
    /// Base URL of the weekly station volume history files.
    pub historic_volumes_base_url: String,
    /// Directory for cached downloads.
    pub cache_dir: PathBuf,
    /// Directory for the output artifacts.
    pub output_dir: PathBuf,
    /// Maximum age of a cached snapshot before it is re-downloaded.
    pub cache_max_age_minutes: i64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            market_orders_url: "https://data.everef.net/market-orders/market-orders-latest.v3.csv.bz2"
                .to_string(),
            historic_prices_base_url: "https://static.adam4eve.eu/MarketPricesStationHistory".to_string(),
            historic_volumes_base_url: "https://static.adam4eve.eu/MarketVolumesStationHistory".to_string(),
            cache_dir: PathBuf::from("data/cache"),
            output_dir: PathBuf::from("data/processed"),
            cache_max_age_minutes: 10,
        }
    }
}

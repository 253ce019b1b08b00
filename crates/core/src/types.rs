//! Core data types for the hauler pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item type identifier.
pub type ItemId = i32;

/// Trading hub (station) identifier.
pub type HubId = i32;

/// A trading hub: a fixed station with a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    /// Station identifier.
    pub id: HubId,
    /// Display name (e.g. "Jita").
    pub name: String,
}

impl Hub {
    /// Create a hub from an id and name.
    pub fn new(id: HubId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// The configured set of trading hubs for a run.
///
/// Immutable for the duration of a run; supplied as configuration,
/// never discovered from the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSet {
    hubs: Vec<Hub>,
}

impl HubSet {
    /// Create a hub set from a list of hubs.
    pub fn new(hubs: Vec<Hub>) -> Self {
        Self { hubs }
    }

    /// Whether the given station id belongs to the set.
    #[inline]
    pub fn contains(&self, id: HubId) -> bool {
        self.hubs.iter().any(|h| h.id == id)
    }

    /// Display name for a hub id, if it is part of the set.
    pub fn name(&self, id: HubId) -> Option<&str> {
        self.hubs.iter().find(|h| h.id == id).map(|h| h.name.as_str())
    }

    /// Iterate over the hub ids in configuration order.
    pub fn ids(&self) -> impl Iterator<Item = HubId> + '_ {
        self.hubs.iter().map(|h| h.id)
    }

    /// Number of configured hubs.
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    /// Number of distinct hub ids in the set.
    pub fn distinct_len(&self) -> usize {
        let mut ids: Vec<HubId> = self.hubs.iter().map(|h| h.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

/// One sell order from a market snapshot.
///
/// The wire format uses `type_id` / `station_id` / `volume_remain`; serde
/// aliases accept both namings. `is_buy_order` defaults to false so feeds
/// that were already filtered upstream parse cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    /// Item type on offer.
    #[serde(alias = "type_id")]
    pub item_id: ItemId,
    /// Station the order sits at.
    #[serde(alias = "station_id")]
    pub hub_id: HubId,
    /// Ask price per unit.
    pub price: f64,
    /// Units still available on this order.
    #[serde(alias = "volume_remain")]
    pub remaining_quantity: u64,
    /// True for buy orders; excluded by the reducer.
    #[serde(default)]
    pub is_buy_order: bool,
}

/// The reduced best-offer record for one (item, hub) pair.
///
/// Invariant: `supply >= remaining_quantity` — the headline order is always
/// inside its own depth band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub item_id: ItemId,
    pub hub_id: HubId,
    /// Minimum ask price at this hub for this item.
    pub best_price: f64,
    /// Units remaining on the headline (minimum-price) order.
    pub remaining_quantity: u64,
    /// Total units across all orders priced within the depth band
    /// above `best_price`.
    pub supply: u64,
}

impl Quote {
    /// Price ceiling of the depth band: `best_price * (1 + depth_margin)`.
    #[inline]
    pub fn depth_threshold(&self, depth_margin: f64) -> f64 {
        self.best_price * (1.0 + depth_margin)
    }

    /// Directional profit margin when buying here and selling at `dest`.
    ///
    /// `(dest.best_price - self.best_price) / self.best_price` — note the
    /// origin price in the denominator, so (A→B) and (B→A) are independent.
    #[inline]
    pub fn profit_margin_to(&self, dest: &Quote) -> f64 {
        (dest.best_price - self.best_price) / self.best_price
    }
}

/// Most-recent weekly price/volume statistics for one (item, hub) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStat {
    pub item_id: ItemId,
    pub hub_id: HubId,
    /// Date of the record; only the most recent per key is used.
    pub date: NaiveDate,
    /// Weekly low sell price.
    pub low_price: f64,
    /// Weekly average sell price.
    pub avg_price: f64,
    /// Weekly average sell volume.
    pub avg_volume: f64,
}

/// A directional hub-to-hub arbitrage candidate for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePair {
    pub item_id: ItemId,
    pub origin_hub: HubId,
    pub destination_hub: HubId,
    pub origin_price: f64,
    pub destination_price: f64,
    pub origin_remaining_quantity: u64,
    pub destination_remaining_quantity: u64,
    pub origin_supply: u64,
    pub destination_supply: u64,
    /// `(destination_price - origin_price) / origin_price`.
    pub profit_margin: f64,
    /// Weekly low sell price at the destination, when history matched.
    pub destination_historical_low_price: Option<f64>,
    /// Weekly average sell price at the destination.
    pub destination_historical_avg_price: Option<f64>,
    /// Weekly average sell volume at the destination.
    pub destination_historical_avg_volume: Option<f64>,
}

//! Quote reduction: raw order book → one best-offer row per (item, hub).
//!
//! Orders are filtered to sell orders at configured hubs, items present at
//! fewer than two hubs are discarded, and each surviving (item, hub) group
//! collapses to its minimum-price order plus an aggregate supply figure.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use hauler_core::{HubId, HubSet, ItemId, Quote, RawOrder};

/// Statistics about a reduction pass.
///
/// Row-level problems are counted here rather than aborting the run; the
/// caller decides what to log.
#[derive(Debug, Clone, Default)]
pub struct ReductionStats {
    /// Orders seen on input.
    pub input_orders: u64,
    /// Buy orders excluded by the idempotent pre-filter.
    pub buy_orders_dropped: u64,
    /// Orders at stations outside the configured hub set.
    pub foreign_hub_dropped: u64,
    /// Orders with a non-finite or non-positive price.
    pub invalid_price_dropped: u64,
    /// Items discarded for spanning fewer than two hubs.
    pub single_hub_items_dropped: u64,
    /// Quotes emitted.
    pub quotes_emitted: u64,
}

impl ReductionStats {
    /// Total orders dropped before grouping.
    pub fn dropped(&self) -> u64 {
        self.buy_orders_dropped + self.foreign_hub_dropped + self.invalid_price_dropped
    }
}

/// Reduce a raw order snapshot to one quote per (item, hub) pair.
///
/// Only items observed at two or more distinct hubs survive; a single-hub
/// item has no possible origin/destination pair. Empty input yields empty
/// output, never an error.
///
/// When several orders share the minimum price, the headline order is the
/// first one at that price in input order. The minimum price itself is
/// unaffected, but `remaining_quantity` depends on this tie-break, so it is
/// fixed deterministically here.
pub fn reduce_quotes(
    orders: &[RawOrder],
    hubs: &HubSet,
    depth_margin: f64,
) -> (Vec<Quote>, ReductionStats) {
    let mut stats = ReductionStats {
        input_orders: orders.len() as u64,
        ..ReductionStats::default()
    };

    let mut by_item: HashMap<ItemId, Vec<&RawOrder>> = HashMap::new();
    for order in orders {
        if order.is_buy_order {
            stats.buy_orders_dropped += 1;
            continue;
        }
        if !hubs.contains(order.hub_id) {
            stats.foreign_hub_dropped += 1;
            continue;
        }
        if !order.price.is_finite() || order.price <= 0.0 {
            stats.invalid_price_dropped += 1;
            continue;
        }
        by_item.entry(order.item_id).or_default().push(order);
    }

    let mut quotes = Vec::new();
    for (item_id, group) in by_item {
        let distinct_hubs: HashSet<HubId> = group.iter().map(|o| o.hub_id).collect();
        if distinct_hubs.len() < 2 {
            stats.single_hub_items_dropped += 1;
            continue;
        }

        // Vec order inside each hub group preserves input order, which the
        // headline tie-break relies on.
        let by_hub = group.iter().map(|o| (o.hub_id, *o)).into_group_map();
        for (hub_id, hub_orders) in by_hub {
            quotes.push(reduce_hub_group(item_id, hub_id, &hub_orders, depth_margin));
        }
    }

    quotes.sort_by_key(|q| (q.item_id, q.hub_id));
    stats.quotes_emitted = quotes.len() as u64;
    (quotes, stats)
}

/// Collapse the orders of one (item, hub) group into a quote.
fn reduce_hub_group(
    item_id: ItemId,
    hub_id: HubId,
    orders: &[&RawOrder],
    depth_margin: f64,
) -> Quote {
    let mut headline = orders[0];
    for &order in &orders[1..] {
        // Strictly-less keeps the first-seen order on price ties.
        if order.price < headline.price {
            headline = order;
        }
    }

    // Inclusive band: an order exactly at the threshold counts.
    let threshold = headline.price * (1.0 + depth_margin);
    let supply = orders
        .iter()
        .filter(|o| o.price <= threshold)
        .fold(0u64, |acc, o| acc.saturating_add(o.remaining_quantity));

    Quote {
        item_id,
        hub_id,
        best_price: headline.price,
        remaining_quantity: headline.remaining_quantity,
        supply,
    }
}

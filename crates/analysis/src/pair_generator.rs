//! Trade pair generation: quotes → directional hub-to-hub candidates.
//!
//! For each item quoted at two or more hubs, every ordered (origin,
//! destination) pair is a candidate. Margins are directional — (A→B) and
//! (B→A) use different denominators — so both directions are evaluated
//! independently.

use std::cmp::Reverse;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use hauler_core::{Quote, TradePair};

use crate::history::HistoryIndex;

/// Enumerate profitable directional trade pairs from reduced quotes.
///
/// A pair is retained when its margin is at or above `margin_threshold`.
/// When a history index is supplied, the destination's most recent record is
/// joined onto the pair; a missing record leaves the historical fields
/// `None` and never drops the pair.
///
/// The result is sorted by profit margin descending. Items are visited in
/// ascending id order and hubs in quote order, and the sort is stable, so
/// identical input always produces identical output.
pub fn generate_pairs(
    quotes: &[Quote],
    history: Option<&HistoryIndex>,
    margin_threshold: f64,
) -> Vec<TradePair> {
    let by_item = quotes.iter().map(|q| (q.item_id, q)).into_group_map();

    let mut pairs = Vec::new();
    for (_, group) in by_item.into_iter().sorted_by_key(|(item_id, _)| *item_id) {
        if group.iter().map(|q| q.hub_id).unique().count() < 2 {
            continue;
        }
        for perm in group.iter().permutations(2) {
            let (origin, dest) = (*perm[0], *perm[1]);
            if origin.hub_id == dest.hub_id {
                continue;
            }
            let margin = origin.profit_margin_to(dest);
            if margin >= margin_threshold {
                pairs.push(build_pair(origin, dest, margin, history));
            }
        }
    }

    pairs.sort_by_key(|p| Reverse(OrderedFloat(p.profit_margin)));
    pairs
}

fn build_pair(
    origin: &Quote,
    dest: &Quote,
    profit_margin: f64,
    history: Option<&HistoryIndex>,
) -> TradePair {
    let stat = history.and_then(|h| h.get(dest.item_id, dest.hub_id));
    TradePair {
        item_id: origin.item_id,
        origin_hub: origin.hub_id,
        destination_hub: dest.hub_id,
        origin_price: origin.best_price,
        destination_price: dest.best_price,
        origin_remaining_quantity: origin.remaining_quantity,
        destination_remaining_quantity: dest.remaining_quantity,
        origin_supply: origin.supply,
        destination_supply: dest.supply,
        profit_margin,
        destination_historical_low_price: stat.map(|s| s.low_price),
        destination_historical_avg_price: stat.map(|s| s.avg_price),
        destination_historical_avg_volume: stat.map(|s| s.avg_volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use hauler_core::{HistoricalStat, HubId, ItemId};

    fn quote(item_id: ItemId, hub_id: HubId, best_price: f64, qty: u64, supply: u64) -> Quote {
        Quote {
            item_id,
            hub_id,
            best_price,
            remaining_quantity: qty,
            supply,
        }
    }

    fn stat(item_id: ItemId, hub_id: HubId, low: f64, avg: f64, volume: f64) -> HistoricalStat {
        HistoricalStat {
            item_id,
            hub_id,
            date: NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
            low_price: low,
            avg_price: avg,
            avg_volume: volume,
        }
    }

    #[test]
    fn test_scenario_a_one_direction_emitted() {
        let quotes = vec![quote(10, 1, 100.0, 5, 8), quote(10, 2, 150.0, 2, 2)];
        let pairs = generate_pairs(&quotes, None, 0.10);

        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!((pair.origin_hub, pair.destination_hub), (1, 2));
        assert_relative_eq!(pair.profit_margin, 0.50);
        assert_relative_eq!(pair.origin_price, 100.0);
        assert_relative_eq!(pair.destination_price, 150.0);
        assert_eq!(pair.origin_remaining_quantity, 5);
        assert_eq!(pair.destination_remaining_quantity, 2);
        assert_eq!(pair.origin_supply, 8);
        assert_eq!(pair.destination_supply, 2);
    }

    #[test]
    fn test_sub_threshold_margin_not_emitted() {
        // 100 -> 105 is only 5%: below the 10% default, no pair either way.
        let quotes = vec![quote(10, 1, 100.0, 5, 5), quote(10, 2, 105.0, 2, 2)];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_margin_exactly_at_threshold_retained() {
        let quotes = vec![quote(10, 1, 100.0, 5, 5), quote(10, 2, 110.0, 2, 2)];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert_eq!(pairs.len(), 1);
        assert_relative_eq!(pairs[0].profit_margin, 0.10);
    }

    #[test]
    fn test_all_emitted_pairs_clear_threshold() {
        let quotes = vec![
            quote(10, 1, 100.0, 5, 8),
            quote(10, 2, 150.0, 2, 2),
            quote(10, 3, 90.0, 1, 1),
            quote(20, 1, 10.0, 4, 4),
            quote(20, 2, 10.5, 6, 6),
        ];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert!(!pairs.is_empty());
        for pair in &pairs {
            assert!(pair.profit_margin >= 0.10);
        }
    }

    #[test]
    fn test_both_directions_evaluated_independently() {
        // With a zero threshold, one direction is +50% and the other is
        // -33%: only the former clears.
        let quotes = vec![quote(10, 1, 100.0, 5, 8), quote(10, 2, 150.0, 2, 2)];
        let pairs = generate_pairs(&quotes, None, 0.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].origin_hub, pairs[0].destination_hub), (1, 2));
    }

    #[test]
    fn test_three_hub_permutation_is_complete() {
        // All pairwise prices differ enough that every ordered pair with a
        // cheaper origin clears: (3,1) (3,2) (1,2) from prices 90/120/150.
        let quotes = vec![
            quote(10, 1, 120.0, 1, 1),
            quote(10, 2, 150.0, 1, 1),
            quote(10, 3, 90.0, 1, 1),
        ];
        let pairs = generate_pairs(&quotes, None, 0.10);
        let routes: Vec<(HubId, HubId)> =
            pairs.iter().map(|p| (p.origin_hub, p.destination_hub)).collect();
        assert_eq!(pairs.len(), 3);
        assert!(routes.contains(&(3, 2)));
        assert!(routes.contains(&(3, 1)));
        assert!(routes.contains(&(1, 2)));
    }

    #[test]
    fn test_sorted_by_margin_descending() {
        let quotes = vec![
            quote(10, 1, 100.0, 1, 1),
            quote(10, 2, 150.0, 1, 1),
            quote(20, 1, 100.0, 1, 1),
            quote(20, 2, 120.0, 1, 1),
            quote(30, 1, 100.0, 1, 1),
            quote(30, 2, 200.0, 1, 1),
        ];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert_eq!(pairs.len(), 3);
        for window in pairs.windows(2) {
            assert!(window[0].profit_margin >= window[1].profit_margin);
        }
        assert_eq!(pairs[0].item_id, 30);
        assert_eq!(pairs[2].item_id, 20);
    }

    #[test]
    fn test_equal_margins_keep_enumeration_order() {
        // Identical margins across two items: ascending item order wins.
        let quotes = vec![
            quote(20, 1, 10.0, 1, 1),
            quote(20, 2, 15.0, 1, 1),
            quote(10, 1, 100.0, 1, 1),
            quote(10, 2, 150.0, 1, 1),
        ];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].item_id, 10);
        assert_eq!(pairs[1].item_id, 20);
    }

    #[test]
    fn test_history_joined_on_destination_only() {
        // History exists for (10, Hub2) but not (10, Hub1): the pair into
        // Hub2 is enriched, the pair into Hub1 is not, and neither is
        // dropped.
        let quotes = vec![quote(10, 1, 100.0, 5, 8), quote(10, 2, 150.0, 2, 2)];
        let index = HistoryIndex::from_stats(vec![stat(10, 2, 140.0, 145.0, 3000.0)]);
        let pairs = generate_pairs(&quotes, Some(&index), 0.0);

        assert_eq!(pairs.len(), 1);
        let into_hub2 = &pairs[0];
        assert_eq!(into_hub2.destination_hub, 2);
        assert_eq!(into_hub2.destination_historical_low_price, Some(140.0));
        assert_eq!(into_hub2.destination_historical_avg_price, Some(145.0));
        assert_eq!(into_hub2.destination_historical_avg_volume, Some(3000.0));

        // Reverse the prices so the other direction clears instead.
        let quotes = vec![quote(10, 1, 150.0, 5, 8), quote(10, 2, 100.0, 2, 2)];
        let pairs = generate_pairs(&quotes, Some(&index), 0.0);
        assert_eq!(pairs.len(), 1);
        let into_hub1 = &pairs[0];
        assert_eq!(into_hub1.destination_hub, 1);
        assert_eq!(into_hub1.destination_historical_low_price, None);
        assert_eq!(into_hub1.destination_historical_avg_price, None);
        assert_eq!(into_hub1.destination_historical_avg_volume, None);
    }

    #[test]
    fn test_no_history_means_unenriched_not_empty() {
        let quotes = vec![quote(10, 1, 100.0, 5, 8), quote(10, 2, 150.0, 2, 2)];
        let pairs = generate_pairs(&quotes, None, 0.10);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].destination_historical_low_price.is_none());
    }

    #[test]
    fn test_empty_quotes_yield_empty_pairs() {
        let pairs = generate_pairs(&[], None, 0.10);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_single_hub_group_skipped() {
        // The reducer already drops single-hub items, but quotes can also
        // arrive from other callers.
        let quotes = vec![quote(10, 1, 100.0, 5, 8)];
        let pairs = generate_pairs(&quotes, None, 0.0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_reproducible_for_identical_input() {
        let quotes = vec![
            quote(10, 1, 100.0, 5, 8),
            quote(10, 2, 150.0, 2, 2),
            quote(20, 1, 10.0, 1, 1),
            quote(20, 2, 15.0, 1, 1),
        ];
        let first = generate_pairs(&quotes, None, 0.10);
        let second = generate_pairs(&quotes, None, 0.10);
        assert_eq!(first, second);
    }
}

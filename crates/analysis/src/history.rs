//! Most-recent-record index over historical price/volume stats.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use hauler_core::{HistoricalStat, HubId, ItemId};

/// Historical stats keyed by (item, hub), keeping only the most recent
/// record per key.
///
/// Dated duplicates are resolved deterministically: a record replaces the
/// stored one only when its date is strictly greater, so on equal dates the
/// first record in input order wins.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    by_key: HashMap<(ItemId, HubId), HistoricalStat>,
}

impl HistoryIndex {
    /// Build the index from raw records.
    pub fn from_stats(stats: impl IntoIterator<Item = HistoricalStat>) -> Self {
        let mut by_key = HashMap::new();
        for stat in stats {
            match by_key.entry((stat.item_id, stat.hub_id)) {
                Entry::Vacant(entry) => {
                    entry.insert(stat);
                }
                Entry::Occupied(mut entry) => {
                    if stat.date > entry.get().date {
                        entry.insert(stat);
                    }
                }
            }
        }
        Self { by_key }
    }

    /// Look up the most recent record for an (item, hub) key.
    pub fn get(&self, item_id: ItemId, hub_id: HubId) -> Option<&HistoricalStat> {
        self.by_key.get(&(item_id, hub_id))
    }

    /// Number of distinct (item, hub) keys indexed.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

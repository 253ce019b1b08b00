//! Parsing of the raw market order snapshot.

use hauler_core::RawOrder;
use tracing::debug;

/// Statistics about a snapshot parse.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    /// Data rows seen (header excluded).
    pub rows: u64,
    /// Rows parsed into orders.
    pub parsed: u64,
    /// Rows skipped as malformed.
    pub malformed: u64,
}

/// Parse a comma-delimited order snapshot.
///
/// Malformed rows (unparseable numbers, negative quantities, missing
/// required columns) are skipped and counted; they never abort the parse.
/// A snapshot whose rows are all malformed yields an empty vector, which
/// downstream stages treat as a legitimate empty result.
pub fn parse_orders(csv_text: &str) -> (Vec<RawOrder>, ParseStats) {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut stats = ParseStats::default();
    let mut orders = Vec::new();

    for result in reader.deserialize::<RawOrder>() {
        stats.rows += 1;
        match result {
            Ok(order) => {
                orders.push(order);
                stats.parsed += 1;
            }
            Err(err) => {
                debug!(row = stats.rows, %err, "skipping malformed order row");
                stats.malformed += 1;
            }
        }
    }

    (orders, stats)
}

//! CSV artifact writers.
//!
//! Artifacts are always well-formed: a run with zero surviving rows still
//! produces a file with the full header, so downstream consumers never see
//! a missing or truncated table.

use std::fs;
use std::path::Path;

use hauler_core::{Quote, Result, TradePair};

/// Column order of the quote artifact.
const QUOTE_HEADER: [&str; 5] = [
    "item_id",
    "hub_id",
    "best_price",
    "remaining_quantity",
    "supply",
];

/// Column order of the trade pair artifact.
const TRADE_PAIR_HEADER: [&str; 13] = [
    "item_id",
    "origin_hub",
    "destination_hub",
    "origin_price",
    "destination_price",
    "origin_remaining_quantity",
    "destination_remaining_quantity",
    "origin_supply",
    "destination_supply",
    "profit_margin",
    "destination_historical_low_price",
    "destination_historical_avg_price",
    "destination_historical_avg_volume",
];

/// Write the quote table.
pub fn write_quotes(path: &Path, quotes: &[Quote]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(QUOTE_HEADER)?;
    for quote in quotes {
        writer.write_record(&[
            quote.item_id.to_string(),
            quote.hub_id.to_string(),
            quote.best_price.to_string(),
            quote.remaining_quantity.to_string(),
            quote.supply.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the trade pair table. Absent historical fields serialize as empty.
pub fn write_pairs(path: &Path, pairs: &[TradePair]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TRADE_PAIR_HEADER)?;
    for pair in pairs {
        writer.write_record(&[
            pair.item_id.to_string(),
            pair.origin_hub.to_string(),
            pair.destination_hub.to_string(),
            pair.origin_price.to_string(),
            pair.destination_price.to_string(),
            pair.origin_remaining_quantity.to_string(),
            pair.destination_remaining_quantity.to_string(),
            pair.origin_supply.to_string(),
            pair.destination_supply.to_string(),
            pair.profit_margin.to_string(),
            optional(pair.destination_historical_low_price),
            optional(pair.destination_historical_avg_price),
            optional(pair.destination_historical_avg_volume),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> Quote {
        Quote {
            item_id: 34,
            hub_id: 60003760,
            best_price: 4.97,
            remaining_quantity: 1000,
            supply: 4200,
        }
    }

    fn pair(enriched: bool) -> TradePair {
        TradePair {
            item_id: 34,
            origin_hub: 60003760,
            destination_hub: 60008494,
            origin_price: 4.97,
            destination_price: 6.5,
            origin_remaining_quantity: 1000,
            destination_remaining_quantity: 50,
            origin_supply: 4200,
            destination_supply: 75,
            profit_margin: 0.3078470824949698,
            destination_historical_low_price: enriched.then_some(6.0),
            destination_historical_avg_price: enriched.then_some(6.4),
            destination_historical_avg_volume: enriched.then_some(900.0),
        }
    }

    #[test]
    fn test_empty_quote_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.csv");
        write_quotes(&path, &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "item_id,hub_id,best_price,remaining_quantity,supply\n");
    }

    #[test]
    fn test_quote_rows_follow_contract_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.csv");
        write_quotes(&path, &[quote()]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("item_id,hub_id,best_price,remaining_quantity,supply")
        );
        assert_eq!(lines.next(), Some("34,60003760,4.97,1000,4200"));
    }

    #[test]
    fn test_empty_pair_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trade_pairs.csv");
        write_pairs(&path, &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("item_id,origin_hub,destination_hub,"));
    }

    #[test]
    fn test_missing_history_serializes_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trade_pairs.csv");
        write_pairs(&path, &[pair(false), pair(true)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].ends_with(",,,"));
        assert!(rows[2].ends_with(",6,6.4,900"));
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/quotes.csv");
        write_quotes(&path, &[quote()]).unwrap();
        assert!(path.exists());
    }
}

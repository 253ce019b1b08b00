//! Quote reduction and trade pair generation for the hauler pipeline.
//!
//! This crate holds the analytical core:
//! - Reducing a raw order book to one best-offer quote per (item, hub)
//! - Enumerating profitable directional hub-to-hub trade pairs
//! - Indexing historical stats by their most recent record
//!
//! Everything here is a pure function of its inputs; acquisition of the
//! snapshots lives in `hauler-ingestion`.

pub mod history;
pub mod pair_generator;
pub mod quote_reducer;

pub use history::HistoryIndex;
pub use pair_generator::generate_pairs;
pub use quote_reducer::{reduce_quotes, ReductionStats};

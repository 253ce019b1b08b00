//! Core types and configuration for the hauler pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (orders, quotes, historical stats, trade pairs)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

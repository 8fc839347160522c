//! CLI utility functions
//!
//! Helpers shared across commands: opening the store and rendering records.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::core::open::{open_store, OpenOptions, OpenedStore};

/// Open the configured store
pub fn open(opts: &OpenOptions) -> Result<OpenedStore> {
    open_store(opts).context("Failed to open storage")
}

/// Render unix milliseconds as local time, or `-` when unknown
pub fn format_updated(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

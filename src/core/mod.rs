//! Core module - Storage aggregation
//!
//! Contains the stores and the merge logic behind the aggregated view.

pub mod composite;
pub mod json_store;
pub mod merge;
pub mod model;
pub mod open;
pub mod sqlite_store;
pub mod store;
pub mod timestamps;
pub mod worktree;

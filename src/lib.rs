//! ocstore - read-only view of OpenCode projects and sessions
//!
//! OpenCode keeps its projects and sessions in a SQLite database; older
//! versions wrote one JSON document per record instead. This crate reads
//! either or both and presents them as one deduplicated, ordered listing.
//!
//! ## Key Concepts
//!
//! - **Store**: uniform async query interface ([`Store`]) implemented by both
//!   backends and by the aggregator
//! - **Read-only**: nothing is ever written to either source
//! - **Global project**: the singleton project `global` with worktree `/`;
//!   other `global` records from a second source become alias projects
//! - **Snapshots**: every query reads fresh data, nothing is watched

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::core::composite::CompositeStore;
pub use crate::core::json_store::JsonStore;
pub use crate::core::model::{Project, ProjectAlias, Session};
pub use crate::core::open::{check_readable, open_store, OpenOptions, OpenedStore};
pub use crate::core::sqlite_store::SqliteStore;
pub use crate::core::store::Store;
pub use error::{Backend, Result, StoreError};

//! Store abstraction
//!
//! Provides a unified interface over the document store, the relational
//! store and the aggregator that combines them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │            CompositeStore             │
//! │  ┌──────────────┬─────────────────┐   │
//! │  │  SqliteStore │    JsonStore    │   │
//! │  │  (current)   │    (legacy)     │   │
//! │  └──────────────┴─────────────────┘   │
//! └───────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use super::model::{Project, Session};
use crate::error::Result;

/// Read-only access to OpenCode projects and sessions.
///
/// Every call is a fresh snapshot of the backing data. Dropping a returned
/// future cancels the query.
#[async_trait]
pub trait Store: Send + Sync {
    /// All projects, most recently updated first.
    async fn projects(&self) -> Result<Vec<Project>>;

    /// Sessions of one project, most recently updated first.
    ///
    /// For the aggregator, alias ids are only known after
    /// [`projects`](Store::projects) has run at least once.
    async fn sessions(&self, project_id: &str) -> Result<Vec<Session>>;

    /// Release the underlying handles.
    fn close(&self) -> Result<()>;
}


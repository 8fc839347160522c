//! Composite store - aggregated view over SQLite and legacy JSON
//!
//! Queries both configured backends, merges their results and resolves the
//! global project collision.
//!
//! # Aliases
//!
//! When a backend reports a project with id `global` but a real worktree,
//! the merged listing exposes it under a synthetic alias id. Session queries
//! for that alias read the sessions of `global` and keep only those whose
//! directory lies within the alias worktree.
//!
//! The alias table is rebuilt by every successful [`Store::projects`] call.
//! Callers must list projects at least once before relying on alias ids in
//! [`Store::sessions`]; an id that is not a known alias is queried literally.

use std::sync::RwLock;

use async_trait::async_trait;

use super::merge::{merge_projects, merge_sessions, resolve, Outcome, SourceStatus};
use super::model::{AliasTable, Project, ProjectAlias, Session};
use super::store::Store;
use super::worktree::dir_within_prefix;
use crate::error::{Backend, Result, StoreError};

/// Aggregating store
///
/// SQLite is the primary source: on duplicate ids its records win.
pub struct CompositeStore {
    sqlite: Option<Box<dyn Store>>,
    /// Why a configured SQLite store could not be opened
    sqlite_open_error: Option<String>,
    json: Option<Box<dyn Store>>,
    aliases: RwLock<AliasTable>,
}

impl CompositeStore {
    /// Either backend may be absent.
    pub fn new(sqlite: Option<Box<dyn Store>>, json: Option<Box<dyn Store>>) -> Self {
        Self {
            sqlite,
            sqlite_open_error: None,
            json,
            aliases: RwLock::new(AliasTable::new()),
        }
    }

    /// Record that SQLite was configured but failed to open.
    ///
    /// Every query then counts SQLite as failed with this error rather than
    /// absent, so a JSON failure yields [`StoreError::Combined`].
    pub fn with_sqlite_open_error(mut self, err: StoreError) -> Self {
        let reason = match err {
            StoreError::Unavailable { reason, .. } => reason,
            other => other.to_string(),
        };
        self.sqlite_open_error = Some(reason);
        self
    }

    pub fn has_sqlite(&self) -> bool {
        self.sqlite.is_some()
    }

    pub fn has_json(&self) -> bool {
        self.json.is_some()
    }

    /// Snapshot of the alias table installed by the last project listing
    pub fn aliases(&self) -> Result<AliasTable> {
        let aliases = self
            .aliases
            .read()
            .map_err(|e| StoreError::Task(format!("alias table lock poisoned: {}", e)))?;
        Ok(aliases.clone())
    }

    fn unopened_sqlite<T>(&self) -> Option<Result<T>> {
        self.sqlite_open_error
            .as_ref()
            .map(|reason| Err(StoreError::unavailable(Backend::Relational, reason)))
    }

    fn resolve_alias(&self, project_id: &str) -> Result<Option<ProjectAlias>> {
        let aliases = self
            .aliases
            .read()
            .map_err(|e| StoreError::Task(format!("alias table lock poisoned: {}", e)))?;
        Ok(aliases.get(project_id).cloned())
    }

    fn install_aliases(&self, table: AliasTable) -> Result<()> {
        let mut aliases = self
            .aliases
            .write()
            .map_err(|e| StoreError::Task(format!("alias table lock poisoned: {}", e)))?;
        *aliases = table;
        Ok(())
    }

    /// Sessions of a real project id, merged across backends
    async fn sessions_base(&self, project_id: &str) -> Result<Vec<Session>> {
        let relational = match &self.sqlite {
            Some(store) => Some(store.sessions(project_id).await),
            None => self.unopened_sqlite(),
        };
        let document = match &self.json {
            Some(store) => Some(store.sessions(project_id).await),
            None => None,
        };

        match resolve(
            SourceStatus::from_query(relational),
            SourceStatus::from_query(document),
        ) {
            Outcome::Single(sessions) => Ok(sessions),
            Outcome::Merge {
                relational,
                document,
            } => Ok(merge_sessions(relational, document)),
            Outcome::Fail(e) => Err(e),
        }
    }
}

#[async_trait]
impl Store for CompositeStore {
    async fn projects(&self) -> Result<Vec<Project>> {
        let relational = match &self.sqlite {
            Some(store) => Some(store.projects().await),
            None => self.unopened_sqlite(),
        };
        let document = match &self.json {
            Some(store) => Some(store.projects().await),
            None => None,
        };

        // Built outside the lock, installed as one unit
        let (projects, table) = match resolve(
            SourceStatus::from_query(relational),
            SourceStatus::from_query(document),
        ) {
            Outcome::Single(projects) => (projects, AliasTable::new()),
            Outcome::Merge {
                relational,
                document,
            } => merge_projects(relational, document),
            Outcome::Fail(e) => return Err(e),
        };

        tracing::debug!(
            projects = projects.len(),
            aliases = table.len(),
            "listed projects"
        );
        self.install_aliases(table)?;
        Ok(projects)
    }

    async fn sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        let Some(alias) = self.resolve_alias(project_id)? else {
            return self.sessions_base(project_id).await;
        };

        tracing::debug!(
            alias = project_id,
            base = %alias.base_project_id,
            prefix = %alias.dir_prefix,
            "resolved project alias"
        );
        let sessions = self.sessions_base(&alias.base_project_id).await?;
        if alias.dir_prefix.trim().is_empty() {
            return Ok(sessions);
        }

        Ok(sessions
            .into_iter()
            .filter(|s| dir_within_prefix(&s.directory, &alias.dir_prefix))
            .collect())
    }

    /// Closes SQLite (its error is returned); the JSON store holds nothing
    /// worth reporting.
    fn close(&self) -> Result<()> {
        let result = match &self.sqlite {
            Some(store) => store.close(),
            None => Ok(()),
        };
        if let Some(store) = &self.json {
            let _ = store.close();
        }
        result
    }
}

//! Merge - Combining the results of both backends
//!
//! Pure functions with no hidden state: everything the aggregator needs is
//! passed in and returned, so each rule can be tested without a backend.
//!
//! # Key Points
//! - `primary` is the authoritative source (SQLite); on duplicate ids it wins
//!   entirely, no field-level merge
//! - Only when a canonical global project (`global`, `/`) is present do other
//!   `global` projects become aliases
//! - Output is sorted by `updated` descending, ties keep merge order

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::model::{AliasTable, Project, ProjectAlias, Session, GLOBAL_PROJECT_ID};
use crate::error::{Result, StoreError};

/// Prefix of synthesized alias project ids
pub const ALIAS_PREFIX: &str = "global-alias-";

/// Deterministic alias id for a colliding global worktree.
///
/// `global-alias-` followed by the first 12 hex digits of SHA-256 of the
/// trimmed worktree.
pub fn synthetic_global_project_id(worktree: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(worktree.trim().as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("{}{}", ALIAS_PREFIX, &hex[..12])
}

/// Merge project lists, resolving global id collisions into aliases.
///
/// Returns the merged projects (sorted) and the alias table to install.
pub fn merge_projects(primary: Vec<Project>, secondary: Vec<Project>) -> (Vec<Project>, AliasTable) {
    let mut aliases = AliasTable::new();

    let Some(canonical) = pick_canonical_global(&primary, &secondary) else {
        return (sort_by_updated(merge_prefer_first(primary, secondary, |p| &p.id)), aliases);
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Project> = Vec::with_capacity(primary.len() + secondary.len() + 1);
    let mut collisions: Vec<Project> = Vec::new();
    let mut collision_worktrees: HashSet<String> = HashSet::new();

    for project in primary.into_iter().chain(secondary) {
        if project.is_global() {
            let worktree = project.worktree.trim().to_string();
            if !project.is_canonical_global()
                && !worktree.is_empty()
                && collision_worktrees.insert(worktree)
            {
                collisions.push(project);
            }
            continue;
        }

        let id = project.id.trim();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }
        merged.push(project);
    }

    merged.push(canonical);

    for project in collisions {
        let worktree = project.worktree.trim().to_string();
        let alias_id = synthetic_global_project_id(&worktree);
        aliases.insert(
            alias_id.clone(),
            ProjectAlias {
                base_project_id: GLOBAL_PROJECT_ID.to_string(),
                dir_prefix: worktree.clone(),
            },
        );
        merged.push(Project::new(alias_id, worktree, project.updated));
    }

    (sort_by_updated(merged), aliases)
}

/// Merge session lists by id, first list wins on duplicates.
pub fn merge_sessions(primary: Vec<Session>, secondary: Vec<Session>) -> Vec<Session> {
    sort_by_updated(merge_prefer_first(primary, secondary, |s| &s.id))
}

/// First canonical global in priority order.
fn pick_canonical_global(primary: &[Project], secondary: &[Project]) -> Option<Project> {
    primary
        .iter()
        .chain(secondary)
        .find(|p| p.is_canonical_global())
        .cloned()
}

fn merge_prefer_first<T, F>(primary: Vec<T>, secondary: Vec<T>, id: F) -> Vec<T>
where
    F: Fn(&T) -> &String,
{
    let mut seen: HashSet<String> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut out = Vec::with_capacity(primary.len() + secondary.len());
    for item in primary.into_iter().chain(secondary) {
        if seen.insert(id(&item).clone()) {
            out.push(item);
        }
    }
    out
}

/// Anything with an update time.
pub trait Updated {
    fn updated(&self) -> i64;
}

impl Updated for Project {
    fn updated(&self) -> i64 {
        self.updated
    }
}

impl Updated for Session {
    fn updated(&self) -> i64 {
        self.updated
    }
}

/// Stable sort, most recently updated first.
pub fn sort_by_updated<T: Updated>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| b.updated().cmp(&a.updated()));
    items
}

/// What one backend contributed to a query
#[derive(Debug)]
pub enum SourceStatus<T> {
    /// Backend not configured
    Unavailable,
    Succeeded(T),
    Failed(StoreError),
}

impl<T> SourceStatus<T> {
    /// Status of an optional backend's query result.
    pub fn from_query(result: Option<Result<T>>) -> Self {
        match result {
            None => SourceStatus::Unavailable,
            Some(Ok(value)) => SourceStatus::Succeeded(value),
            Some(Err(e)) => SourceStatus::Failed(e),
        }
    }
}

/// How to combine the two backends' results
#[derive(Debug)]
pub enum Outcome<T> {
    /// Exactly one usable result; returned unmodified
    Single(T),
    /// Both succeeded: merge `relational` (wins) with `document`
    Merge { relational: T, document: T },
    Fail(StoreError),
}

/// Decide the outcome of a query from both backends' status.
///
/// A backend that is simply not configured is never an error source; when
/// both are configured, both must fail for the query to fail.
pub fn resolve<T>(relational: SourceStatus<T>, document: SourceStatus<T>) -> Outcome<T> {
    use SourceStatus::*;

    match (relational, document) {
        (Succeeded(relational), Succeeded(document)) => Outcome::Merge { relational, document },
        (Succeeded(value), Unavailable | Failed(_)) => Outcome::Single(value),
        (Unavailable | Failed(_), Succeeded(value)) => Outcome::Single(value),
        (Failed(relational), Failed(document)) => Outcome::Fail(StoreError::Combined {
            relational: Box::new(relational),
            document: Box::new(document),
        }),
        (Failed(e), Unavailable) | (Unavailable, Failed(e)) => Outcome::Fail(e),
        (Unavailable, Unavailable) => Outcome::Fail(StoreError::Config(
            "no storage sources configured".to_string(),
        )),
    }
}

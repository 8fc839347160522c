//! Project and session records shared by every store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Id of the canonical global project.
pub const GLOBAL_PROJECT_ID: &str = "global";

/// Worktree of the canonical global project.
pub const GLOBAL_WORKTREE: &str = "/";

/// Title used when a session has none.
pub const UNTITLED: &str = "untitled";

/// A project as reported by a store.
///
/// Ids are assigned by the backend and are not unique across backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub worktree: String,
    /// Unix milliseconds
    pub updated: i64,
}

impl Project {
    pub fn new(id: impl Into<String>, worktree: impl Into<String>, updated: i64) -> Self {
        Self {
            id: id.into(),
            worktree: worktree.into(),
            updated,
        }
    }

    /// Reported with the global id, whatever the worktree.
    pub fn is_global(&self) -> bool {
        self.id.trim() == GLOBAL_PROJECT_ID
    }

    /// The singleton global project: id `global`, worktree `/`.
    pub fn is_canonical_global(&self) -> bool {
        self.is_global() && self.worktree.trim() == GLOBAL_WORKTREE
    }
}

/// A session belonging to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    /// May be empty
    pub directory: String,
    /// Unix milliseconds
    pub updated: i64,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        directory: impl Into<String>,
        updated: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            directory: directory.into(),
            updated,
        }
    }
}

/// Where an alias project id points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAlias {
    pub base_project_id: String,
    pub dir_prefix: String,
}

/// Alias id -> alias target.
pub type AliasTable = HashMap<String, ProjectAlias>;

/// Trimmed title, or [`UNTITLED`] when blank.
pub(crate) fn title_or_untitled(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

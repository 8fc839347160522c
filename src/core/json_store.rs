//! Legacy JSON document store
//!
//! OpenCode used to keep one JSON document per project and per session:
//!
//! ```text
//! <root>/storage/project/<projectID>.json
//! <root>/storage/session/<projectID>/<sessionID>.json
//! ```
//!
//! Documents are parsed permissively: unknown fields are ignored and the
//! update time may live either at the top level or under `time.updated`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

use super::model::{title_or_untitled, Project, Session};
use super::store::Store;
use crate::error::{Result, StoreError};

/// Loosely-typed shape shared by project and session documents
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    worktree: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    directory: Option<String>,
    #[serde(default)]
    updated: Option<i64>,
    #[serde(default)]
    time: Option<RawTime>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTime {
    #[serde(default)]
    updated: Option<i64>,
}

impl RawDocument {
    /// Top-level `updated` wins unless it is zero or absent.
    fn updated(&self) -> i64 {
        match self.updated {
            Some(ts) if ts != 0 => ts,
            _ => self
                .time
                .as_ref()
                .and_then(|t| t.updated)
                .unwrap_or(0),
        }
    }

    fn text(field: &Option<String>) -> &str {
        field.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Read-only store over the legacy JSON tree
#[derive(Debug, Clone)]
pub struct JsonStore {
    storage_root: PathBuf,
}

impl JsonStore {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// `<root>/storage/project`
    pub fn project_dir(&self) -> PathBuf {
        self.storage_root.join("storage").join("project")
    }

    /// `<root>/storage/session/<projectID>`
    pub fn session_dir(&self, project_id: &str) -> PathBuf {
        self.storage_root
            .join("storage")
            .join("session")
            .join(project_id)
    }

    /// Load every project document, most recently updated first.
    ///
    /// A missing or unreadable project directory is an error, and so is a
    /// single malformed document.
    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        let dir = self.project_dir();
        let files = json_files(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let mut projects = Vec::with_capacity(files.len());
        for path in files {
            let raw = read_document(&path).await?;
            let id = RawDocument::text(&raw.id);
            let worktree = RawDocument::text(&raw.worktree);
            if id.is_empty() || worktree.is_empty() {
                continue;
            }
            projects.push(Project::new(id, worktree, raw.updated()));
        }

        // Stable: ties keep file name order
        projects.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(projects)
    }

    /// Load the session documents of one project, most recently updated first.
    ///
    /// A project without a session directory has no sessions.
    pub async fn load_sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(StoreError::EmptyProjectId);
        }
        // Ids never name a directory outside storage/session
        if project_id.contains(['/', '\\']) || project_id == ".." || project_id == "." {
            return Ok(Vec::new());
        }

        let dir = self.session_dir(project_id);
        let files = match json_files(&dir).await {
            Ok(files) => files,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut sessions = Vec::with_capacity(files.len());
        for path in files {
            let raw = read_document(&path).await?;
            let id = RawDocument::text(&raw.id);
            if id.is_empty() {
                continue;
            }
            sessions.push(Session::new(
                id,
                title_or_untitled(RawDocument::text(&raw.title)),
                RawDocument::text(&raw.directory),
                raw.updated(),
            ));
        }

        sessions.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(sessions)
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn projects(&self) -> Result<Vec<Project>> {
        self.load_projects().await
    }

    async fn sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        self.load_sessions(project_id).await
    }

    /// Nothing to release.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Paths of the candidate documents in `dir`, sorted by file name.
///
/// Skips directories, non-`.json` names and hidden files (editor swap files).
/// Names need not be valid UTF-8.
async fn json_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".json") || name.starts_with('.') {
            continue;
        }
        files.push(entry.path());
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

async fn read_document(path: &Path) -> Result<RawDocument> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        source,
    })
}

//! SQLite store - current OpenCode storage
//!
//! Reads the `project` and `session` tables of OpenCode's database.
//!
//! # Key Points
//! - Opened read-only, with `query_only` on top, so writes are impossible
//! - `busy_timeout` of 2s so a concurrently writing OpenCode does not turn
//!   lock contention into a hard failure
//! - A single connection; queries run on the blocking pool
//! - Dropping a query future interrupts the running statement

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, InterruptHandle, OpenFlags};

use super::model::{title_or_untitled, Project, Session};
use super::store::Store;
use super::timestamps::normalize_unix_millis;
use crate::error::{Backend, Result, StoreError};

/// How long a statement waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(2000);

const PROJECTS_SQL: &str =
    r#"SELECT id, worktree, time_updated FROM "project" ORDER BY time_updated DESC"#;

const SESSIONS_SQL: &str = r#"SELECT id, title, directory, time_updated FROM "session" WHERE project_id = ?1 ORDER BY time_updated DESC"#;

/// Read-only SQLite store
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
    interrupt: Arc<InterruptHandle>,
    db_path: PathBuf,
    /// `Some(has time_archived)` once probed, `None` if the probe failed
    session_columns: Arc<OnceLock<Option<bool>>>,
}

impl SqliteStore {
    /// Open an existing database read-only.
    ///
    /// Fails if the path is empty, the file does not exist, or the handle
    /// does not pass a liveness check.
    pub fn open(path: &Path) -> Result<Self> {
        if path.to_string_lossy().trim().is_empty() {
            return Err(StoreError::Config("empty db path".to_string()));
        }
        let db_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| unavailable(&db_path, e))?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| unavailable(&db_path, e))?;
        conn.execute_batch("PRAGMA query_only = 1;")
            .map_err(|e| unavailable(&db_path, e))?;

        // Reading the schema catches files that are not databases
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| unavailable(&db_path, e))?;

        tracing::debug!(path = %db_path.display(), "opened sqlite store read-only");

        Ok(Self {
            interrupt: Arc::new(conn.get_interrupt_handle()),
            conn: Arc::new(Mutex::new(Some(conn))),
            db_path,
            session_columns: Arc::new(OnceLock::new()),
        })
    }

    /// Absolute path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the `session` table carries the optional `time_archived`
    /// column. `None` until the first session query, or if the probe failed.
    ///
    /// Informational only; sessions are never filtered on it.
    pub fn session_has_archived(&self) -> Option<bool> {
        self.session_columns.get().copied().flatten()
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let state = Arc::new(Mutex::new(QueryState::Pending));
        let mut guard = CancelGuard {
            state: Arc::clone(&state),
            interrupt: Arc::clone(&self.interrupt),
            armed: true,
        };

        let joined = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("connection lock poisoned: {}", e)))?;
            {
                let mut state = lock_state(&state);
                if *state != QueryState::Pending {
                    return Err(StoreError::Task("query cancelled".to_string()));
                }
                *state = QueryState::Running;
            }
            let result = match conn.as_ref() {
                Some(conn) => f(conn),
                None => Err(StoreError::unavailable(Backend::Relational, "store closed")),
            };
            // Still holding the connection, so an interrupt issued before
            // this point cannot reach another query
            *lock_state(&state) = QueryState::Done;
            result
        })
        .await;

        guard.armed = false;
        joined.map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn projects(&self) -> Result<Vec<Project>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(PROJECTS_SQL)?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })?;

            let mut projects = Vec::new();
            for row in rows {
                let (id, worktree, updated) = row?;
                let id = id.as_deref().unwrap_or("").trim();
                let worktree = worktree.as_deref().unwrap_or("").trim();
                if id.is_empty() || worktree.is_empty() {
                    continue;
                }
                projects.push(Project::new(
                    id,
                    worktree,
                    normalize_unix_millis(updated.unwrap_or(0)),
                ));
            }
            Ok(projects)
        })
        .await
    }

    async fn sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        let project_id = project_id.trim().to_string();
        if project_id.is_empty() {
            return Err(StoreError::EmptyProjectId);
        }

        let columns = Arc::clone(&self.session_columns);
        self.with_conn(move |conn| {
            columns.get_or_init(|| probe_session_archived(conn));

            let mut stmt = conn.prepare(SESSIONS_SQL)?;
            let rows = stmt.query_map([&project_id], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?;

            let mut sessions = Vec::new();
            for row in rows {
                let (id, title, directory, updated) = row?;
                let id = id.as_deref().unwrap_or("").trim();
                if id.is_empty() {
                    continue;
                }
                sessions.push(Session::new(
                    id,
                    title_or_untitled(title.as_deref().unwrap_or("")),
                    directory.as_deref().unwrap_or("").trim(),
                    normalize_unix_millis(updated.unwrap_or(0)),
                ));
            }
            Ok(sessions)
        })
        .await
    }

    /// Close the connection. Later queries fail as unavailable.
    fn close(&self) -> Result<()> {
        let mut slot = self
            .conn
            .lock()
            .map_err(|e| StoreError::Task(format!("connection lock poisoned: {}", e)))?;
        match slot.take() {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::Sqlite(e)),
            None => Ok(()),
        }
    }
}

/// Look for the optional `time_archived` column on `session`.
fn probe_session_archived(conn: &Connection) -> Option<bool> {
    let probe = || -> rusqlite::Result<bool> {
        let mut stmt = conn.prepare(r#"PRAGMA table_info("session")"#)?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for name in names {
            if name?.trim().eq_ignore_ascii_case("time_archived") {
                return Ok(true);
            }
        }
        Ok(false)
    };

    match probe() {
        Ok(has_archived) => {
            tracing::debug!(has_archived, "probed sqlite session columns");
            Some(has_archived)
        }
        Err(_) => None,
    }
}

fn unavailable(path: &Path, err: rusqlite::Error) -> StoreError {
    StoreError::unavailable(Backend::Relational, format!("{}: {}", path.display(), err))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryState {
    Pending,
    Running,
    Done,
    Cancelled,
}

fn lock_state(state: &Mutex<QueryState>) -> std::sync::MutexGuard<'_, QueryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forwards cancellation of a query future to SQLite.
///
/// A query that has not started yet is prevented from starting; a running
/// one is interrupted. The interrupt is issued under the query's state lock,
/// and the worker marks itself done under the same lock before releasing
/// the connection.
struct CancelGuard {
    state: Arc<Mutex<QueryState>>,
    interrupt: Arc<InterruptHandle>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock_state(&self.state);
        match *state {
            QueryState::Pending => *state = QueryState::Cancelled,
            QueryState::Running => self.interrupt.interrupt(),
            QueryState::Done | QueryState::Cancelled => {}
        }
    }
}

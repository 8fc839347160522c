//! Opening the configured data sources
//!
//! Default mode reads SQLite only. Legacy mode also reads the JSON tree and
//! merges both, tolerating a missing database.

use std::path::PathBuf;

use async_trait::async_trait;

use super::composite::CompositeStore;
use super::json_store::JsonStore;
use super::model::{Project, Session};
use super::sqlite_store::SqliteStore;
use super::store::Store;
use crate::error::{Backend, Result, StoreError};

/// Which sources to open and where they live
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// OpenCode data directory (parent of `storage/`)
    pub storage_root: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
    /// Also read legacy JSON documents and merge them with SQLite
    pub use_legacy: bool,
    /// Never open SQLite
    pub disable_sqlite: bool,
}

/// A ready-to-query store
pub enum OpenedStore {
    /// Default mode
    Sqlite(SqliteStore),
    /// Legacy mode
    Composite(CompositeStore),
}

/// Open the store selected by `opts`.
///
/// In legacy mode a database that cannot be opened does not fail here: the
/// JSON tree is used alone, and the open error is reported alongside the
/// JSON error if that fails too.
pub fn open_store(opts: &OpenOptions) -> Result<OpenedStore> {
    if !opts.use_legacy {
        if opts.disable_sqlite {
            return Err(StoreError::Config(
                "sqlite disabled and legacy disabled".to_string(),
            ));
        }
        let store = SqliteStore::open(&opts.db_path)?;
        tracing::debug!(db = %store.db_path().display(), "opened sqlite-only store");
        return Ok(OpenedStore::Sqlite(store));
    }

    let json: Option<Box<dyn Store>> = Some(Box::new(JsonStore::new(&opts.storage_root)));
    let store = if opts.disable_sqlite {
        CompositeStore::new(None, json)
    } else {
        match SqliteStore::open(&opts.db_path) {
            Ok(sqlite) => CompositeStore::new(Some(Box::new(sqlite)), json),
            Err(e) => {
                tracing::debug!(error = %e, "sqlite not opened, reading json only");
                CompositeStore::new(None, json).with_sqlite_open_error(e)
            }
        }
    };
    tracing::debug!(
        root = %opts.storage_root.display(),
        sqlite = store.has_sqlite(),
        json = store.has_json(),
        "opened legacy composite store"
    );
    Ok(OpenedStore::Composite(store))
}

/// Check that the sources selected by `opts` can be read, without keeping
/// anything open.
///
/// The error says which source was tried and why it is unreadable.
pub fn check_readable(opts: &OpenOptions) -> Result<()> {
    if !opts.use_legacy {
        if opts.disable_sqlite {
            return Err(StoreError::Config(
                "sqlite disabled and legacy disabled".to_string(),
            ));
        }
        return check_sqlite_readable(opts);
    }

    let json = check_json_readable(opts);
    if opts.disable_sqlite {
        return json;
    }
    let json_err = match json {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    let sqlite_err = match check_sqlite_readable(opts) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    Err(StoreError::Combined {
        relational: Box::new(sqlite_err),
        document: Box::new(json_err),
    })
}

fn check_sqlite_readable(opts: &OpenOptions) -> Result<()> {
    SqliteStore::open(&opts.db_path)?.close()
}

/// The project directory is the minimum the JSON store needs.
fn check_json_readable(opts: &OpenOptions) -> Result<()> {
    let root = &opts.storage_root;
    if root.to_string_lossy().trim().is_empty() {
        return Err(StoreError::Config("empty storage root".to_string()));
    }

    let meta = std::fs::metadata(root).map_err(|e| StoreError::io(root, e))?;
    if !meta.is_dir() {
        return Err(StoreError::unavailable(
            Backend::Document,
            format!("not a directory: {}", root.display()),
        ));
    }

    let project_dir = JsonStore::new(root).project_dir();
    std::fs::read_dir(&project_dir).map_err(|e| StoreError::io(&project_dir, e))?;
    Ok(())
}

#[async_trait]
impl Store for OpenedStore {
    async fn projects(&self) -> Result<Vec<Project>> {
        match self {
            OpenedStore::Sqlite(store) => store.projects().await,
            OpenedStore::Composite(store) => store.projects().await,
        }
    }

    async fn sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        match self {
            OpenedStore::Sqlite(store) => store.sessions(project_id).await,
            OpenedStore::Composite(store) => store.sessions(project_id).await,
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            OpenedStore::Sqlite(store) => store.close(),
            OpenedStore::Composite(store) => store.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sqlite_store::tests::{create_test_db, insert_project};
    use tempfile::TempDir;

    fn write_project(root: &std::path::Path, name: &str, contents: &str) {
        let dir = root.join("storage").join("project");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn test_default_mode_is_sqlite_only() {
        let root = TempDir::new().unwrap();
        let db_dir = TempDir::new().unwrap();
        let db = create_test_db(&db_dir);
        insert_project(&db, "p1", "/db", 1);
        write_project(root.path(), "p2.json", r#"{"id":"p2","worktree":"/json"}"#);

        let store = open_store(&OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: db,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(store, OpenedStore::Sqlite(_)));
        let projects = store.projects().await.unwrap();
        assert_eq!(projects, vec![Project::new("p1", "/db", 1000)]);
        store.close().unwrap();
    }

    #[test]
    fn test_default_mode_fails_without_db() {
        let root = TempDir::new().unwrap();
        let result = open_store(&OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: root.path().join("missing.db"),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
    }

    #[test]
    fn test_default_mode_with_sqlite_disabled_is_config_error() {
        let result = open_store(&OpenOptions {
            disable_sqlite: true,
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_legacy_falls_back_to_json_when_sqlite_cannot_open() {
        let root = TempDir::new().unwrap();
        write_project(
            root.path(),
            "p1.json",
            r#"{"id":"p1","worktree":"/json","time":{"updated":1}}"#,
        );

        let store = open_store(&OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: root.path().join("does-not-exist.db"),
            use_legacy: true,
            disable_sqlite: false,
        })
        .unwrap();

        assert!(matches!(store, OpenedStore::Composite(_)));
        let projects = store.projects().await.unwrap();
        assert_eq!(projects, vec![Project::new("p1", "/json", 1)]);
        store.close().unwrap();
    }

    #[tokio::test]
    async fn test_legacy_with_nothing_readable_fails() {
        let root = TempDir::new().unwrap();
        let store = open_store(&OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: root.path().join("does-not-exist.db"),
            use_legacy: true,
            disable_sqlite: false,
        })
        .unwrap();

        let err = store.projects().await.unwrap_err();
        assert!(matches!(err, StoreError::Combined { .. }));
        let message = err.to_string();
        assert!(message.contains("does-not-exist.db"));
        assert!(message.contains("; json: "));
    }

    #[test]
    fn test_check_ok_if_db_readable_even_when_json_missing() {
        let root = TempDir::new().unwrap();
        let db_dir = TempDir::new().unwrap();
        let db = create_test_db(&db_dir);

        let opts = OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: db,
            ..Default::default()
        };
        check_readable(&opts).unwrap();
        check_readable(&OpenOptions {
            use_legacy: true,
            ..opts
        })
        .unwrap();
    }

    #[test]
    fn test_check_disable_sqlite_requires_json() {
        let root = TempDir::new().unwrap();
        let db_dir = TempDir::new().unwrap();
        let db = create_test_db(&db_dir);

        let opts = OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: db,
            use_legacy: true,
            disable_sqlite: true,
        };
        assert!(check_readable(&opts).is_err());

        write_project(root.path(), "p.json", r#"{"id":"p","worktree":"/p"}"#);
        check_readable(&opts).unwrap();
    }

    #[test]
    fn test_check_default_errors_when_db_missing() {
        let root = TempDir::new().unwrap();
        let opts = OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: root.path().join("missing.db"),
            ..Default::default()
        };
        assert!(check_readable(&opts).is_err());
    }

    #[test]
    fn test_check_legacy_reports_both_sources() {
        let root = TempDir::new().unwrap();
        let opts = OpenOptions {
            storage_root: root.path().to_path_buf(),
            db_path: root.path().join("missing.db"),
            use_legacy: true,
            disable_sqlite: false,
        };

        let err = check_readable(&opts).unwrap_err();
        assert!(matches!(err, StoreError::Combined { .. }));
        let message = err.to_string();
        assert!(message.starts_with("sqlite: sqlite unavailable: "));
        assert!(message.contains("; json: "));
    }

    #[test]
    fn test_check_json_root_must_be_directory() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("file");
        std::fs::write(&file, "x").unwrap();

        let opts = OpenOptions {
            storage_root: file,
            use_legacy: true,
            disable_sqlite: true,
            ..Default::default()
        };
        let message = check_readable(&opts).unwrap_err().to_string();
        assert!(message.contains("not a directory"));
    }
}

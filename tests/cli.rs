//! Binary-level tests for the `ocstore` CLI

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::{params, Connection};
use tempfile::TempDir;

use ocstore::core::merge::synthetic_global_project_id;

fn create_db(dir: &Path) -> PathBuf {
    let path = dir.join("opencode.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE "project" (id TEXT PRIMARY KEY, worktree TEXT NOT NULL, time_updated INTEGER NOT NULL);
        CREATE TABLE "session" (id TEXT PRIMARY KEY, project_id TEXT NOT NULL, title TEXT NOT NULL, directory TEXT NOT NULL, time_updated INTEGER NOT NULL);
        "#,
    )
    .unwrap();
    path
}

fn write_json(dir: &Path, name: &str, contents: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

/// Command isolated from the caller's home and environment
fn ocstore(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ocstore").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("OC_STORAGE_ROOT")
        .env_remove("OC_DB_PATH")
        .env_remove("OC_DISABLE_SQLITE")
        .env_remove("OCSTORE_CONFIG");
    cmd
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    ocstore(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("sessions"));
}

#[test]
fn test_check_fails_without_database() {
    let home = TempDir::new().unwrap();
    ocstore(&home)
        .args(["--storage", home.path().to_str().unwrap(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("storage missing/unreadable"))
        .stderr(predicate::str::contains("opencode.db"));
}

#[test]
fn test_check_passes_with_database() {
    let home = TempDir::new().unwrap();
    create_db(home.path());

    ocstore(&home)
        .args(["--storage", home.path().to_str().unwrap(), "check"])
        .assert()
        .success();
}

#[test]
fn test_projects_json_from_sqlite() {
    let home = TempDir::new().unwrap();
    let db = create_db(home.path());
    {
        let conn = Connection::open(&db).unwrap();
        conn.execute(
            r#"INSERT INTO "project" (id, worktree, time_updated) VALUES (?1, ?2, ?3)"#,
            params!["p1", "/work/p1", 1_700_000_000i64],
        )
        .unwrap();
    }

    ocstore(&home)
        .env("OC_DB_PATH", &db)
        .args(["projects", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"p1\""))
        .stdout(predicate::str::contains("1700000000000"));
}

#[test]
fn test_legacy_alias_sessions() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("opencode");
    let db = create_db(home.path());
    let wt = "/Users/alice/work/proj";
    {
        let conn = Connection::open(&db).unwrap();
        conn.execute(
            r#"INSERT INTO "project" (id, worktree, time_updated) VALUES (?1, ?2, ?3)"#,
            params!["global", wt, 10i64],
        )
        .unwrap();
    }
    write_json(
        &root.join("storage").join("project"),
        "global.json",
        r#"{"id":"global","worktree":"/","time":{"updated":1}}"#,
    );
    let sessions = root.join("storage").join("session").join("global");
    write_json(
        &sessions,
        "s1.json",
        r#"{"id":"s1","title":"inside","directory":"/Users/alice/work/proj/sub","updated":2}"#,
    );
    write_json(
        &sessions,
        "s2.json",
        r#"{"id":"s2","title":"outside","directory":"/Users/alice/work/projector","updated":3}"#,
    );

    let alias_id = synthetic_global_project_id(wt);

    ocstore(&home)
        .args(["--storage", root.to_str().unwrap()])
        .args(["--db", db.to_str().unwrap()])
        .args(["--legacy", "projects", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(alias_id.as_str()));

    ocstore(&home)
        .args(["--storage", root.to_str().unwrap()])
        .args(["--db", db.to_str().unwrap()])
        .args(["--legacy", "sessions", alias_id.as_str(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"s1\""))
        .stdout(predicate::str::contains("\"s2\"").not());
}

#[test]
fn test_sessions_disabled_sqlite_without_legacy_fails() {
    let home = TempDir::new().unwrap();
    create_db(home.path());

    ocstore(&home)
        .env("OC_DISABLE_SQLITE", "1")
        .args(["--storage", home.path().to_str().unwrap(), "sessions", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sqlite disabled and legacy disabled"));
}

//! Configuration module
//!
//! Where the OpenCode data lives and which sources to read. Values come from,
//! in priority order: environment variables, command-line overrides, the
//! config file, built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::core::open::OpenOptions;

/// Environment variable overriding the storage root
pub const ENV_STORAGE_ROOT: &str = "OC_STORAGE_ROOT";
/// Environment variable overriding the database path
pub const ENV_DB_PATH: &str = "OC_DB_PATH";
/// Set to `1` to never open SQLite
pub const ENV_DISABLE_SQLITE: &str = "OC_DISABLE_SQLITE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// OpenCode data directory (default: ~/.local/share/opencode)
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// OpenCode database (default: <root>/opencode.db)
    #[serde(default)]
    pub db: Option<PathBuf>,

    /// Also read the legacy JSON tree
    #[serde(default)]
    pub legacy: bool,

    #[serde(default)]
    pub disable_sqlite: bool,
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub storage_root: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub legacy: bool,
}

impl Config {
    /// Load config from the default location, or defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::global_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Get config path (~/.config/ocstore/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.home_dir().join(".config").join("ocstore").join("config.toml"))
    }

    /// Get OpenCode's data directory (~/.local/share/opencode)
    pub fn default_storage_root() -> Option<PathBuf> {
        BaseDirs::new().map(|d| {
            d.home_dir()
                .join(".local")
                .join("share")
                .join("opencode")
        })
    }

    /// Resolve the store options from the process environment
    pub fn open_options(&self, overrides: &Overrides) -> Result<OpenOptions> {
        self.resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve the store options with `env` as the environment
    pub fn resolve<F>(&self, overrides: &Overrides, env: F) -> Result<OpenOptions>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_root = env_path(&env, ENV_STORAGE_ROOT)
            .or_else(|| non_blank(overrides.storage_root.as_deref()))
            .or_else(|| non_blank(self.storage.root.as_deref()))
            .or_else(Self::default_storage_root)
            .context("Cannot determine home directory; set OC_STORAGE_ROOT")?;

        let db_path = env_path(&env, ENV_DB_PATH)
            .or_else(|| non_blank(overrides.db_path.as_deref()))
            .or_else(|| non_blank(self.storage.db.as_deref()))
            .unwrap_or_else(|| storage_root.join("opencode.db"));

        let disable_sqlite = self.storage.disable_sqlite
            || env(ENV_DISABLE_SQLITE).is_some_and(|v| v.trim() == "1");

        Ok(OpenOptions {
            storage_root,
            db_path,
            use_legacy: overrides.legacy || self.storage.legacy,
            disable_sqlite,
        })
    }
}

fn env_path<F>(env: &F, key: &str) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn non_blank(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|p| !p.to_string_lossy().trim().is_empty())
        .map(Path::to_path_buf)
}

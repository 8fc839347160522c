//! CLI module - Command definitions and handlers
//!
//! A thin inspection front-end over the storage layer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{Config, Overrides};
use crate::core::open::OpenOptions;

pub mod check;
pub mod projects;
pub mod sessions;
pub mod utils;

/// ocstore - read-only view of OpenCode projects and sessions
#[derive(Parser, Debug)]
#[command(name = "ocstore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// OpenCode storage root (default: ~/.local/share/opencode)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// OpenCode database path (default: <storage>/opencode.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Also read legacy JSON storage (storage/**) and merge with SQLite
    #[arg(long, global = true)]
    pub legacy: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "OCSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the configured sources are readable
    Check(check::CheckArgs),

    /// List projects
    Projects(projects::ProjectsArgs),

    /// List sessions of a project
    Sessions(sessions::SessionsArgs),
}

impl Cli {
    /// Resolve store options from config file, flags and environment
    pub fn open_options(&self) -> Result<OpenOptions> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        let overrides = Overrides {
            storage_root: self.storage.clone(),
            db_path: self.db.clone(),
            legacy: self.legacy,
        };
        config.open_options(&overrides)
    }
}

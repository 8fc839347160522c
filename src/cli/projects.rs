//! `ocstore projects` command
//!
//! Lists the merged projects, most recently updated first.
//!
//! # Usage
//! ```bash
//! ocstore projects
//! ocstore --legacy projects --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::utils::{format_updated, open};
use crate::core::model::Project;
use crate::core::open::OpenOptions;
use crate::core::store::Store;

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Worktree")]
    worktree: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            worktree: p.worktree.clone(),
            updated: format_updated(p.updated),
        }
    }
}

/// Execute projects command
pub async fn run(args: ProjectsArgs, opts: &OpenOptions) -> Result<()> {
    let store = open(opts)?;
    let projects = store.projects().await;
    store.close()?;
    let projects = projects?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!("{} ({})\n", "📂 Projects".bold(), projects.len());
    let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}

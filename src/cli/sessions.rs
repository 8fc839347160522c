//! `ocstore sessions` command
//!
//! Lists the sessions of one project. Alias project ids from the project
//! listing are accepted.
//!
//! # Usage
//! ```bash
//! ocstore sessions global
//! ocstore --legacy sessions global-alias-3f2a9c0d1e4b --json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::utils::{format_updated, open};
use crate::core::model::Session;
use crate::core::open::OpenOptions;
use crate::core::store::Store;

#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Project id (as shown by `ocstore projects`)
    pub project_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Directory")]
    directory: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            directory: s.directory.clone(),
            updated: format_updated(s.updated),
        }
    }
}

/// Execute sessions command
pub async fn run(args: SessionsArgs, opts: &OpenOptions) -> Result<()> {
    let store = open(opts)?;
    let sessions = list(&store, &args.project_id).await;
    store.close()?;
    let sessions = sessions?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No sessions for {}.", args.project_id);
        return Ok(());
    }

    println!(
        "{} {} ({})\n",
        "💬 Sessions of".bold(),
        args.project_id.cyan(),
        sessions.len()
    );
    let rows: Vec<SessionRow> = sessions.iter().map(SessionRow::from).collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}

/// Projects are listed first so alias ids resolve.
async fn list(store: &impl Store, project_id: &str) -> Result<Vec<Session>> {
    store.projects().await.context("Failed to load projects")?;
    let sessions = store
        .sessions(project_id)
        .await
        .with_context(|| format!("Failed to load sessions of {}", project_id))?;
    Ok(sessions)
}

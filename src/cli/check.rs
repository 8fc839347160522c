//! `ocstore check` command
//!
//! Verifies the configured sources can be read before anything is opened.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::core::open::{check_readable, OpenOptions};

#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Execute check command
pub fn run(_args: CheckArgs, opts: &OpenOptions) -> Result<()> {
    match check_readable(opts) {
        Ok(()) => {
            println!("{} storage readable", "✓".green());
            print_sources(opts);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", "error: OpenCode storage missing/unreadable".red());
            print_sources(opts);
            eprintln!("  detail:   {}", e);
            anyhow::bail!("storage check failed")
        }
    }
}

fn print_sources(opts: &OpenOptions) {
    eprintln!("  storage:  {}", opts.storage_root.display());
    eprintln!("  db:       {}", opts.db_path.display());
    eprintln!("  legacy:   {}", opts.use_legacy);
    eprintln!("  sqlite:   {}", !opts.disable_sqlite);
}

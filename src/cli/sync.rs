//! Restore vendored packages to the revisions recorded in the manifest.

use super::common::{GlobalOptions, open_context};
use crate::utils::ProjectLock;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct SyncCommand {
    /// Print what is out of date without fetching
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Allow plain HTTP for remote discovery
    #[arg(long)]
    insecure: bool,
}

impl SyncCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let mut ctx = open_context(opts, self.insecure)?;
        if self.dry_run {
            for path in ctx.verify()? {
                println!("fetch {path}");
            }
            return Ok(());
        }

        let _lock = ProjectLock::acquire(&ctx.vendor_dir())?;
        let synced = ctx.sync()?;
        if !opts.quiet {
            if synced.is_empty() {
                println!("{} Vendor folder is up to date", "✓".green());
            } else {
                println!("{} Synced {} package(s)", "✓".green(), synced.len());
            }
        }
        Ok(())
    }
}

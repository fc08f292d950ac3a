//! Report whether the vendor folder matches the manifest.

use super::common::{GlobalOptions, open_context};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let mut ctx = open_context(opts, false)?;
        ctx.status()?;
        if !opts.quiet {
            println!("{} Vendor folder is up to date", "✓".green());
        }
        Ok(())
    }
}

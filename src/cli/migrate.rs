//! Convert another vendoring layout.

use super::common::GlobalOptions;
use crate::config::GoEnv;
use crate::migrate::{MigrateFrom, migrate};
use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    /// Godeps/Godeps.json with Godeps/_workspace
    Godep,
    /// Packages copied under internal/
    Internal,
}

#[derive(Args, Debug)]
pub struct MigrateCommand {
    /// Layout to convert from
    #[arg(value_enum)]
    from: Layout,
}

impl MigrateCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let env = GoEnv::from_env()?;
        let root = std::env::current_dir().context("Failed to read the working directory")?;
        let from = match self.from {
            Layout::Godep => MigrateFrom::Godep,
            Layout::Internal => MigrateFrom::Internal,
        };
        let ctx = migrate(env, &root, from)?;
        if !opts.quiet {
            println!(
                "{} Migrated {} package(s) into {}",
                "✓".green(),
                ctx.manifest.package.len(),
                ctx.vendor_dir().display()
            );
        }
        Ok(())
    }
}

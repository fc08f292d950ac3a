//! Print the license files of vendored packages.

use super::common::{GlobalOptions, open_context};
use crate::context::license::find_licenses;
use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::collections::BTreeSet;

#[derive(Args, Debug)]
pub struct LicenseCommand {
    /// Only print file paths, not their contents
    #[arg(short, long)]
    list: bool,
}

impl LicenseCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let ctx = open_context(opts, false)?;
        let vendor_dir = ctx.vendor_dir();

        let mut seen = BTreeSet::new();
        for record in &ctx.manifest.package {
            for file in find_licenses(&vendor_dir, &record.path) {
                if !seen.insert(file.clone()) {
                    continue;
                }
                let shown = file.strip_prefix(&ctx.root_dir).unwrap_or(&file);
                if self.list {
                    println!("{}", shown.display());
                    continue;
                }
                let text = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                println!("{}", format!("==> {} <==", shown.display()).bold());
                println!("{}", text.trim_end());
                println!();
            }
        }
        Ok(())
    }
}

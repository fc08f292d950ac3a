//! List the package graph.

use super::common::{GlobalOptions, cwd_import, open_context, parse_arguments};
use crate::context::{Location, Package, canonical_path};
use crate::utils::fs::has_path_prefix;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Status selectors (`+vendor`, `+external,+program`) or package paths
    specs: Vec<String>,

    /// Also show which packages import each one
    #[arg(short, long)]
    long: bool,

    /// Omit the status column
    #[arg(long)]
    no_status: bool,
}

impl ListCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let mut ctx = open_context(opts, false)?;
        ctx.load_packages()?;

        let base = cwd_import(&ctx);
        let (specs, filter) = parse_arguments(&self.specs, base.as_deref())?;
        let matches_spec = |pkg: &Package| {
            specs.is_empty()
                || specs.iter().any(|s| {
                    let path = canonical_path(&s.path);
                    if s.match_tree {
                        has_path_prefix(&pkg.canonical, path) || has_path_prefix(&pkg.local, &s.path)
                    } else {
                        pkg.canonical == path || pkg.local == s.path
                    }
                })
        };

        let packages: Vec<&Package> = ctx.list(&filter).into_iter().filter(|p| matches_spec(p)).collect();
        for pkg in &packages {
            print_package(pkg, self.no_status);
            if self.long {
                for importer in &pkg.references {
                    println!("    {} {}", "<-".bright_black(), importer);
                }
            }
        }
        Ok(())
    }
}

fn print_package(pkg: &Package, no_status: bool) {
    let mut line = String::new();
    if !no_status {
        let letters = pkg.status.letters();
        let colored = match pkg.status.location {
            Location::Vendor => letters.green(),
            Location::External => letters.yellow(),
            Location::NotFound => letters.red(),
            Location::Standard => letters.bright_black(),
            _ => letters.normal(),
        };
        line.push_str(&format!("{colored} "));
    }
    line.push_str(&pkg.local);
    if pkg.local != pkg.canonical && pkg.status.location != Location::Vendor {
        line.push_str(&format!(" [{}]", pkg.canonical));
    }
    if !pkg.origin.is_empty() {
        line.push_str(&format!(" ::{}", pkg.origin));
    }
    println!("{line}");
}

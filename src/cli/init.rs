//! Create the vendor manifest.

use super::common::{GlobalOptions, load_config};
use crate::config::GoEnv;
use crate::context::Context;
use crate::manifest::{Manifest, manifest_path};
use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitCommand {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Build tags and package prefixes to ignore (defaults to the global config)
    #[arg(long)]
    ignore: Option<String>,

    /// Import path of the project when it lives outside GOPATH
    #[arg(long)]
    root_path: Option<String>,
}

impl InitCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let config = load_config(opts)?;
        let env = GoEnv::from_env()?;
        let root = match self.path {
            Some(path) => path,
            None => std::env::current_dir().context("Failed to read the working directory")?,
        };
        let ignore = self.ignore.unwrap_or_else(|| config.ignore.clone());
        let existed = manifest_path(&root).exists();

        let ctx = match self.root_path {
            Some(root_path) if !existed => {
                let mut manifest = Manifest::new(&ignore);
                manifest.root_path = root_path;
                let mut ctx = Context::new(env, &root, manifest)?;
                ctx.write_manifest()?;
                ctx
            }
            _ => Context::init(env, &root, &ignore)?,
        };

        if !opts.quiet {
            if existed {
                println!("Manifest already exists: {}", ctx.manifest_path.display());
            } else {
                println!("{} Created {} for {}", "✓".green(), ctx.manifest_path.display(), ctx.root_import.bold());
            }
        }
        Ok(())
    }
}

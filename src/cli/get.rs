//! Download a project into GOPATH and restore its vendored packages.

use super::common::{GlobalOptions, load_config};
use crate::config::GoEnv;
use crate::context::Context;
use crate::core::VendorError;
use crate::manifest::manifest_path;
use crate::utils::fs::{ensure_dir, import_to_path};
use crate::vcs::VcsChain;
use crate::vcs::remote::RemoteResolver;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct GetCommand {
    /// Import path of the project
    path: String,

    /// Allow plain HTTP for remote discovery
    #[arg(long)]
    insecure: bool,
}

impl GetCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let config = load_config(opts)?;
        let env = GoEnv::from_env()?;
        let src = env.gopath_srcs().into_iter().next().ok_or_else(|| VendorError::Other {
            message: "GOPATH is empty".to_string(),
        })?;

        let remote = RemoteResolver::new(config.hosts.clone(), self.insecure || config.insecure);
        let repo = remote.resolve(&self.path)?;
        let repo_dir = import_to_path(&src, &repo.root);
        if repo_dir.exists() {
            tracing::info!("{} already exists, skipping download", repo_dir.display());
        } else {
            let vcs_chain = VcsChain::default();
            let vcs = vcs_chain.by_name(&repo.vcs).ok_or_else(|| VendorError::UnknownVcs {
                path: repo.root.clone(),
            })?;
            if let Some(parent) = repo_dir.parent() {
                ensure_dir(parent)?;
            }
            vcs.create(&repo.url, &repo_dir)?;
        }

        let project = import_to_path(&src, &self.path);
        if !manifest_path(&project).exists() {
            if !opts.quiet {
                println!("{} Downloaded {} (no vendor manifest)", "✓".green(), self.path);
            }
            return Ok(());
        }

        let mut ctx = Context::open(env, &project)?;
        ctx.apply_config(&config);
        ctx.set_insecure(self.insecure || config.insecure);
        let synced = ctx.sync()?;
        if !opts.quiet {
            println!("{} Downloaded {} and synced {} package(s)", "✓".green(), self.path, synced.len());
        }
        Ok(())
    }
}

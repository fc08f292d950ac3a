//! Command-line interface for gvend.
//!
//! Each command lives in its own module with a `clap` argument struct and an
//! `execute` method. Commands only translate arguments into calls on
//! [`crate::context::Context`]; the vendoring logic lives in the library.
//!
//! # Usage
//!
//! ```bash
//! gvend init
//! gvend list +external
//! gvend add +external
//! gvend update github.com/pkg/errors@v0.8
//! gvend remove +vendor,+unused
//! gvend status
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - path to the global config file

mod add;
pub mod common;
mod fetch;
mod get;
mod init;
mod license;
mod list;
mod migrate;
mod remove;
mod status;
mod sync;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::GlobalOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gvend",
    about = "Copy Go dependencies into the project vendor folder",
    version,
    long_about = "gvend resolves a Go project's imports, copies external packages into vendor/ and records their origin, revision and checksum in vendor/vendor.json."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the global config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create vendor/vendor.json in the current directory
    Init(init::InitCommand),

    /// List packages and their status
    List(list::ListCommand),

    /// Copy packages from GOPATH into vendor
    Add(add::AddCommand),

    /// Copy vendored packages again from GOPATH
    Update(update::UpdateCommand),

    /// Remove packages from vendor
    Remove(remove::RemoveCommand),

    /// Download packages at a version into vendor
    Fetch(fetch::FetchCommand),

    /// Re-fetch vendored packages that no longer match the manifest
    Sync(sync::SyncCommand),

    /// Exit non-zero when vendor is out of date or packages are missing
    Status(status::StatusCommand),

    /// Move another vendoring layout into vendor
    Migrate(migrate::MigrateCommand),

    /// Download a project into GOPATH and sync its vendor folder
    Get(get::GetCommand),

    /// Print the license files of vendored packages
    License(license::LicenseCommand),
}

impl Cli {
    /// Run the parsed command.
    pub fn execute(self) -> Result<()> {
        common::init_logging(self.verbose, self.quiet);
        let opts = GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            config: self.config,
        };

        match self.command {
            Commands::Init(cmd) => cmd.execute(&opts),
            Commands::List(cmd) => cmd.execute(&opts),
            Commands::Add(cmd) => cmd.execute(&opts),
            Commands::Update(cmd) => cmd.execute(&opts),
            Commands::Remove(cmd) => cmd.execute(&opts),
            Commands::Fetch(cmd) => cmd.execute(&opts),
            Commands::Sync(cmd) => cmd.execute(&opts),
            Commands::Status(cmd) => cmd.execute(&opts),
            Commands::Migrate(cmd) => cmd.execute(&opts),
            Commands::Get(cmd) => cmd.execute(&opts),
            Commands::License(cmd) => cmd.execute(&opts),
        }
    }
}

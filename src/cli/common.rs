//! Helpers shared by the commands: logging setup, opening the project, and
//! the flags and flow of the modifying commands.

use crate::config::{GlobalConfig, GoEnv};
use crate::context::{Context, ModifyKind, ModifyOptions, ResolveStrategy, StatusFilter};
use crate::core::VendorError;
use crate::pkgspec::PkgSpec;
use crate::utils::ProjectLock;
use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use strsim::levenshtein;
use tracing_subscriber::EnvFilter;

/// Maximum edit distance, as a percentage of the path length, for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 40;

/// Options given before the subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

/// Install the `tracing` subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Global config, from `--config` or the default location.
pub fn load_config(opts: &GlobalOptions) -> Result<GlobalConfig> {
    GlobalConfig::load_with_optional(opts.config.clone())
}

/// Open the project containing the working directory.
pub fn open_context(opts: &GlobalOptions, insecure: bool) -> Result<Context> {
    let config = load_config(opts)?;
    let env = GoEnv::from_env()?;
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let mut ctx = Context::open(env, &cwd)?;
    ctx.apply_config(&config);
    if insecure {
        ctx.set_insecure(true);
    }
    Ok(ctx)
}

/// Import path of the working directory, for relative specifiers.
#[must_use]
pub fn cwd_import(ctx: &Context) -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    cwd.starts_with(&ctx.root_dir).then(|| ctx.local_for_dir(&cwd))
}

/// Split arguments into package specifiers and a status filter.
pub fn parse_arguments(args: &[String], cwd_import: Option<&str>) -> Result<(Vec<PkgSpec>, StatusFilter)> {
    let mut filter = StatusFilter::default();
    let mut specs = Vec::new();
    for arg in args {
        match filter.add_arg(arg) {
            Ok(true) => {}
            Ok(false) => specs.push(PkgSpec::parse(arg, cwd_import)?),
            Err(reason) => {
                return Err(VendorError::InvalidSpecifier {
                    spec: arg.clone(),
                    reason,
                }
                .into());
            }
        }
    }
    Ok((specs, filter))
}

/// Known package paths closest to `path`.
#[must_use]
pub fn suggest_packages(ctx: &Context, path: &str) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = ctx
        .packages
        .values()
        .map(|p| (levenshtein(path, &p.canonical), p.canonical.as_str()))
        .filter(|(distance, _)| *distance > 0 && *distance <= path.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(3).map(|(_, p)| p.to_string()).collect()
}

/// Flags shared by `add`, `update`, `remove` and `fetch`.
#[derive(Args, Debug)]
pub struct ModifyArgs {
    /// Package specifiers (`path[/...|/^][::origin][@version]`) or status
    /// selectors (`+external`, `+vendor,+unused`, ...)
    #[arg(required = true)]
    pub specs: Vec<String>,

    /// Print the operations without changing anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Vendor each package with its whole subtree
    #[arg(long)]
    pub tree: bool,

    /// Allow copying from working trees with uncommitted changes
    #[arg(long)]
    pub uncommitted: bool,

    /// Resolve conflicts by picking the shortest source path
    #[arg(long, conflicts_with = "long")]
    pub short: bool,

    /// Resolve conflicts by picking the longest source path
    #[arg(long)]
    pub long: bool,

    /// Allow plain HTTP for remote discovery
    #[arg(long)]
    pub insecure: bool,
}

impl ModifyArgs {
    /// Plan, resolve and apply one modifying command.
    pub fn run(self, kind: ModifyKind, opts: &GlobalOptions) -> Result<()> {
        let mut ctx = open_context(opts, self.insecure)?;
        let _lock = if self.dry_run { None } else { Some(ProjectLock::acquire(&ctx.vendor_dir())?) };
        ctx.load_packages()?;

        let base = cwd_import(&ctx);
        let (specs, filter) = parse_arguments(&self.specs, base.as_deref())?;
        let modify_opts = ModifyOptions {
            tree: self.tree,
            uncommitted: self.uncommitted,
        };

        if !filter.is_empty() {
            ctx.modify_status(&filter, kind, modify_opts)?;
        }
        for spec in &specs {
            if let Err(e) = ctx.modify(spec, kind, modify_opts) {
                if matches!(e.downcast_ref::<VendorError>(), Some(VendorError::NotFoundInSearchPath { .. })) {
                    let suggestions = suggest_packages(&ctx, &spec.path);
                    if !suggestions.is_empty() {
                        eprintln!("{} did you mean: {}", "hint:".cyan(), suggestions.join(", "));
                    }
                }
                return Err(e);
            }
        }

        resolve_conflicts(&mut ctx, self.short, self.long);
        finish(ctx, self.dry_run, opts)
    }
}

/// Settle conflicts: the manifest origin first, then the path length rule
/// when `--short` or `--long` was given.
pub fn resolve_conflicts(ctx: &mut Context, short: bool, long: bool) {
    let mut conflicts = ctx.check();
    if conflicts.is_empty() {
        return;
    }
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ManifestOrigin);
    if long {
        ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::LongestPath);
    } else if short {
        ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ShortestPath);
    }
    ctx.apply_resolutions(&conflicts);
}

/// Print the planned operations, or run them.
pub fn finish(mut ctx: Context, dry_run: bool, opts: &GlobalOptions) -> Result<()> {
    if dry_run {
        print_operations(&ctx);
        return Ok(());
    }
    let count = ctx.ready_operations().count();
    ctx.alter()?;
    if !opts.quiet {
        println!("{} {} operation(s) applied", "✓".green(), count);
    }
    Ok(())
}

/// Print every ready operation and any unresolved conflict.
pub fn print_operations(ctx: &Context) {
    let mut any = false;
    for op in ctx.ready_operations() {
        println!("{op}");
        any = true;
    }
    if !any {
        println!("No operations planned.");
    }
    for conflict in ctx.check() {
        let sources: Vec<&str> = conflict.ops.iter().map(|&i| ctx.operations[i].source.as_str()).collect();
        println!("{} {} <- {}", "conflict:".yellow(), conflict.canonical, sources.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use std::path::Path;

    #[test]
    fn test_parse_arguments() {
        let args = vec!["+vendor,+unused".to_string(), "co2/pk1@v1".to_string(), "+missing".to_string()];
        let (specs, filter) = parse_arguments(&args, None).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(filter.groups.len(), 2);

        let err = parse_arguments(&["+bogus".to_string()], None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VendorError>(),
            Some(VendorError::InvalidSpecifier { .. })
        ));
    }

    #[test]
    fn test_suggest_packages() {
        let env = GoEnv::new("/goroot", vec!["/gopath".into()]);
        let mut ctx = Context::new(env, Path::new("/gopath/src/co1/pk1"), Manifest::new("")).unwrap();
        for path in ["github.com/pkg/errors", "github.com/stretchr/testify"] {
            ctx.packages.insert(path.to_string(), crate::context::Package::not_found(path));
        }
        assert_eq!(suggest_packages(&ctx, "github.com/pkg/erors"), vec!["github.com/pkg/errors"]);
        assert!(suggest_packages(&ctx, "example.org/other").is_empty());
    }
}

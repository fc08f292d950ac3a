//! Command builder shared by the VCS backends.
//!
//! Every backend shells out to its tool through [`VcsCommand`], which locates
//! the binary, runs it in a working directory, captures output and turns a
//! non-zero exit into [`VendorError::VcsCommandError`] carrying stderr.

use crate::core::VendorError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Builder for one invocation of a VCS tool.
///
/// ```rust,no_run
/// use gvend_cli::vcs::VcsCommand;
///
/// # fn example() -> anyhow::Result<()> {
/// let head = VcsCommand::new("git")
///     .args(["rev-parse", "HEAD"])
///     .current_dir("/path/to/repo")
///     .execute_stdout()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VcsCommand {
    program: &'static str,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
    context: Option<String>,
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct VcsCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl VcsCommand {
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            context: None,
        }
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Tag log lines with the package being worked on.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Run the command and capture its output.
    pub fn execute(self) -> Result<VcsCommandOutput> {
        let binary = which::which(self.program).map_err(|_| VendorError::VcsCommandError {
            vcs: self.program.to_string(),
            operation: self.operation(),
            stderr: format!("'{}' is not installed or not in PATH", self.program),
        })?;

        let mut cmd = Command::new(binary);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        match &self.context {
            Some(ctx) => tracing::debug!(
                target: "vcs",
                "({}) Executing command: {} {}",
                ctx,
                self.program,
                self.args.join(" ")
            ),
            None => tracing::debug!(
                target: "vcs",
                "Executing command: {} {}",
                self.program,
                self.args.join(" ")
            ),
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {} {}", self.program, self.args.join(" ")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "vcs",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            return Err(VendorError::VcsCommandError {
                vcs: self.program.to_string(),
                operation: self.operation(),
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stderr.trim().is_empty() {
            tracing::trace!(target: "vcs", "{}", stderr.trim());
        }
        Ok(VcsCommandOutput { stdout, stderr })
    }

    /// Run the command and return trimmed stdout.
    pub fn execute_stdout(self) -> Result<String> {
        Ok(self.execute()?.stdout.trim().to_string())
    }

    /// Run the command, discarding output.
    pub fn execute_success(self) -> Result<()> {
        self.execute().map(|_| ())
    }
}

//! Local git operations for cherry-picking.
//!
//! This module implements the version-control side of the bot:
//! - [`ProcessGit`]: runs one [`GitEffect`] as a `git` subprocess in a worktree
//! - [`WorktreePool`]: hands every branch worker its own detached worktree
//!
//! Subprocesses are spawned with `kill_on_drop`, so a cancelled branch worker
//! does not leave a `git` process running behind it.

pub mod worktree;

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use thiserror::Error;

use crate::effects::{GitEffect, GitInterpreter};

pub use worktree::WorktreePool;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command exited with a non-zero status.
    #[error("git command failed: {command}\n{output}")]
    CommandFailed { command: String, output: String },

    /// Worktree operation failed.
    #[error("worktree error: {details}")]
    WorktreeError { details: String },

    /// IO error (e.g. `git` is not installed).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Create a non-interactive git command for the given working directory.
///
/// Terminal prompts are disabled so a missing credential fails instead of
/// hanging. Global config is left enabled: push credential helpers are read
/// from it.
pub(crate) fn git_command(workdir: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("git");
    cmd.current_dir(workdir);
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.stdin(Stdio::null());
    cmd.kill_on_drop(true);
    cmd
}

/// Joins stdout and stderr the way a terminal would show them.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut combined = String::with_capacity(stdout.len() + stderr.len());
    combined.push_str(stdout.trim_end());
    if !combined.is_empty() && !stderr.trim().is_empty() {
        combined.push('\n');
    }
    combined.push_str(stderr.trim_end());
    combined
}

/// Run a git command in the given working directory.
///
/// Returns the combined output on success, or [`GitError::CommandFailed`]
/// carrying the same output on a non-zero exit.
pub async fn run_git(workdir: &Path, args: &[&str]) -> GitResult<String> {
    let output = git_command(workdir).args(args).output().await?;
    let combined = combined_output(&output);

    if output.status.success() {
        Ok(combined)
    } else {
        Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            output: combined,
        })
    }
}

/// Runs git effects as subprocesses in a single working tree.
#[derive(Debug, Clone)]
pub struct ProcessGit {
    workdir: PathBuf,
}

impl ProcessGit {
    /// Creates an interpreter bound to `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        ProcessGit {
            workdir: workdir.into(),
        }
    }

    /// Returns the working tree this interpreter operates on.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl GitInterpreter for ProcessGit {
    async fn interpret(&self, effect: &GitEffect) -> GitResult<String> {
        let args = effect.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git(&self.workdir, &args).await
    }
}

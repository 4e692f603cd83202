//! Worktree management for per-branch isolation.
//!
//! Each cherry-pick branch gets its own git worktree, enabling:
//! - Concurrent branch workers without a shared index or HEAD
//! - A failed or aborted cherry-pick that cannot leak into another branch
//! - Cleanup by deleting one directory
//!
//! Worktrees are keyed by the deterministic cherry-pick branch name, so a rerun
//! for the same branch finds and replaces any leftover from a crashed run.
//!
//! Worktrees share the main repository's refs and `.git/config`. Adding or
//! removing a worktree and deleting a local branch all write that shared state,
//! so the pool runs them one at a time. Everything else a branch worker does
//! (identity via `config --worktree`, fetch, checkout, cherry-pick, push) only
//! touches its own worktree or its own refs and runs concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::effects::GitWorkspaces;

use super::{GitError, GitResult, ProcessGit, run_git};

/// Creates and removes one detached worktree per cherry-pick branch.
#[derive(Debug, Clone)]
pub struct WorktreePool {
    /// The repository the worktrees are attached to (a clone with an `origin`).
    repo_dir: PathBuf,

    /// Directory holding the worktrees.
    base_dir: PathBuf,

    /// Held while a git command writes the repository's shared config or refs.
    shared: Arc<Mutex<()>>,
}

impl WorktreePool {
    /// Prepares `repo_dir` for per-branch worktrees under `base_dir`.
    ///
    /// Enables `extensions.worktreeConfig` so each worktree carries its own
    /// committer identity, and prunes metadata of worktrees whose directories
    /// are gone.
    pub async fn prepare(
        repo_dir: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
    ) -> GitResult<Self> {
        let pool = WorktreePool {
            repo_dir: repo_dir.into(),
            base_dir: base_dir.into(),
            shared: Arc::default(),
        };

        tokio::fs::create_dir_all(&pool.base_dir).await?;
        run_git(
            &pool.repo_dir,
            &["config", "extensions.worktreeConfig", "true"],
        )
        .await?;
        run_git(&pool.repo_dir, &["worktree", "prune"]).await?;

        Ok(pool)
    }

    /// Returns the repository the worktrees belong to.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Returns the worktree path for a cherry-pick branch.
    ///
    /// Slashes in branch names (`release/1.0`) are percent-escaped so every
    /// worktree is a direct child of the base directory. `%` is escaped too,
    /// which keeps distinct branch names on distinct paths.
    pub fn worktree_path(&self, work_branch: &str) -> PathBuf {
        self.base_dir.join(flatten_branch_name(work_branch))
    }

    fn path_arg(path: &Path) -> GitResult<&str> {
        path.to_str().ok_or_else(|| GitError::WorktreeError {
            details: format!("worktree path is not valid UTF-8: {}", path.display()),
        })
    }

    /// Removes a worktree directory and its git metadata. Idempotent.
    async fn remove_worktree(&self, path: &Path) -> GitResult<()> {
        if !path.exists() {
            return Ok(());
        }

        let path_arg = Self::path_arg(path)?;
        // Twice, so a worktree left locked by an interrupted `add` goes too.
        if let Err(e) = run_git(
            &self.repo_dir,
            &["worktree", "remove", "--force", "--force", path_arg],
        )
        .await
        {
            // Not a registered worktree (e.g. metadata already pruned): drop the directory.
            debug!(path = %path.display(), error = %e, "worktree remove failed, deleting directory");
            tokio::fs::remove_dir_all(path).await?;
            run_git(&self.repo_dir, &["worktree", "prune"]).await?;
        }
        Ok(())
    }

    /// Deletes the local cherry-pick branch if it exists.
    async fn delete_local_branch(&self, work_branch: &str) {
        let ref_name = format!("refs/heads/{}", work_branch);
        let exists = run_git(
            &self.repo_dir,
            &["show-ref", "--verify", "--quiet", &ref_name],
        )
        .await
        .is_ok();

        if exists
            && let Err(e) = run_git(&self.repo_dir, &["branch", "-D", work_branch]).await
        {
            warn!(branch = work_branch, error = %e, "Failed to delete local cherry-pick branch");
        }
    }
}

impl GitWorkspaces for WorktreePool {
    type Git = ProcessGit;

    /// Creates a fresh detached worktree for `work_branch`.
    ///
    /// A leftover worktree or local branch of the same name (from a crashed run)
    /// is removed first, so `checkout -b` in the pipeline starts clean.
    async fn open(&self, work_branch: &str) -> GitResult<ProcessGit> {
        let path = self.worktree_path(work_branch);
        let path_arg = Self::path_arg(&path)?;

        let _shared = self.shared.lock().await;
        self.remove_worktree(&path).await?;
        self.delete_local_branch(work_branch).await;

        // `--force` twice: the path belongs to this branch alone, so a stale
        // (even locked) registration from an interrupted run is replaced.
        run_git(
            &self.repo_dir,
            &[
                "worktree", "add", "--force", "--force", "--detach", path_arg, "HEAD",
            ],
        )
        .await?;

        debug!(branch = work_branch, path = %path.display(), "Created worktree");
        Ok(ProcessGit::new(path))
    }

    async fn release(&self, git: ProcessGit, work_branch: &str) {
        self.clean_up(git.workdir(), work_branch).await;
    }

    async fn discard(&self, work_branch: &str) {
        let path = self.worktree_path(work_branch);
        debug!(branch = work_branch, path = %path.display(), "Discarding interrupted worktree");
        self.clean_up(&path, work_branch).await;
    }
}

impl WorktreePool {
    /// Removes the worktree at `path` and the local `work_branch`, logging failures.
    async fn clean_up(&self, path: &Path, work_branch: &str) {
        let _shared = self.shared.lock().await;
        if let Err(e) = self.remove_worktree(path).await {
            warn!(
                branch = work_branch,
                path = %path.display(),
                error = %e,
                "Failed to remove worktree"
            );
        }
        self.delete_local_branch(work_branch).await;
    }
}

/// Turns a branch name into a single path component, injectively.
fn flatten_branch_name(branch: &str) -> String {
    let mut out = String::with_capacity(branch.len());
    for c in branch.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            c => out.push(c),
        }
    }
    out
}

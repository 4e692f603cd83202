//! Git effect types.
//!
//! These describe the local git operations of a cherry-pick as data. The
//! interpreter turns each one into a single `git` invocation in a worktree.

use serde::{Deserialize, Serialize};

use crate::types::Sha;

/// A single git command issued by the branch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitEffect {
    /// Set `user.name` for the worktree.
    ConfigUserName { name: String },

    /// Set `user.email` for the worktree.
    ConfigUserEmail { email: String },

    /// Fetch a branch from `origin` into `refs/remotes/origin/<branch>`.
    Fetch { branch: String },

    /// Create and check out `branch` starting at `start_point`.
    ///
    /// No upstream is recorded: that would write the config shared by every
    /// worktree of the repository.
    CheckoutNewBranch { branch: String, start_point: String },

    /// Replay a commit onto HEAD.
    ///
    /// `mainline` selects the parent to diff against when `commit` is a merge
    /// commit (`-m <mainline>`).
    CherryPick { commit: Sha, mainline: u32 },

    /// Abandon an in-progress cherry-pick and restore the pre-pick state.
    CherryPickAbort,

    /// Push a local branch to the same name on `origin`.
    Push { branch: String },
}

impl GitEffect {
    /// Returns the `git` arguments that carry out this effect.
    ///
    /// Identity is written with `--worktree` so concurrent worktrees of one
    /// repository do not race on the shared config file.
    pub fn args(&self) -> Vec<String> {
        match self {
            GitEffect::ConfigUserName { name } => {
                vec![
                    "config".into(),
                    "--worktree".into(),
                    "user.name".into(),
                    name.clone(),
                ]
            }
            GitEffect::ConfigUserEmail { email } => {
                vec![
                    "config".into(),
                    "--worktree".into(),
                    "user.email".into(),
                    email.clone(),
                ]
            }
            GitEffect::Fetch { branch } => vec![
                "fetch".into(),
                "origin".into(),
                format!("+refs/heads/{0}:refs/remotes/origin/{0}", branch),
            ],
            GitEffect::CheckoutNewBranch {
                branch,
                start_point,
            } => vec![
                "checkout".into(),
                "--no-track".into(),
                "-b".into(),
                branch.clone(),
                start_point.clone(),
            ],
            GitEffect::CherryPick { commit, mainline } => vec![
                "cherry-pick".into(),
                "-m".into(),
                mainline.to_string(),
                commit.to_string(),
            ],
            GitEffect::CherryPickAbort => vec!["cherry-pick".into(), "--abort".into()],
            GitEffect::Push { branch } => vec!["push".into(), "origin".into(), branch.clone()],
        }
    }

    /// Short name of the operation, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            GitEffect::ConfigUserName { .. } => "config_user_name",
            GitEffect::ConfigUserEmail { .. } => "config_user_email",
            GitEffect::Fetch { .. } => "fetch",
            GitEffect::CheckoutNewBranch { .. } => "checkout_new_branch",
            GitEffect::CherryPick { .. } => "cherry_pick",
            GitEffect::CherryPickAbort => "cherry_pick_abort",
            GitEffect::Push { .. } => "push",
        }
    }
}

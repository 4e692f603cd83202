//! The cherry-pick request shared by every branch worker.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, RepoId};

/// Identity used for the commits and pushes the bot makes.
///
/// Written to the worktree's git config before the cherry-pick so the replayed
/// commit carries this committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    /// The committer name (git `user.name`).
    pub name: String,

    /// The committer email (git `user.email`).
    pub email: String,
}

impl CommitIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        CommitIdentity {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A request to cherry-pick one merged PR onto a set of target branches.
///
/// Immutable once validated; the coordinator shares it read-only with every
/// branch worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickRequest {
    /// The merged PR whose merge commit is replayed.
    pub pr: PrNumber,

    /// The repository the PR belongs to.
    pub repo: RepoId,

    /// Target branches, in the order outcomes are reported.
    pub branches: Vec<String>,

    /// Committer identity for the replayed commits.
    pub identity: CommitIdentity,
}

//! Errors that end a branch's cherry-pick.

use serde::Serialize;
use thiserror::Error;

use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::preflight::InvalidConfig;
use crate::types::PrNumber;

/// Why a branch failed.
///
/// Every variant is folded into that branch's [`Outcome`](super::Outcome); the
/// coordinator never propagates it further.
#[derive(Debug, Error)]
pub enum CherryPickError {
    /// The request failed preflight validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] InvalidConfig),

    /// Reading the source PR failed.
    #[error("failed to fetch PR {pr}: {source}")]
    FetchPr {
        pr: PrNumber,
        #[source]
        source: GitHubApiError,
    },

    /// The source PR is not (known to be) merged.
    #[error("PR {pr} is not merged yet (state: {state}). Cherry-pick requires merged PRs.")]
    NotMerged { pr: PrNumber, state: String },

    #[error("failed to configure git user name: {0}")]
    ConfigureName(#[source] GitError),

    #[error("failed to configure git user email: {0}")]
    ConfigureEmail(#[source] GitError),

    /// The target branch could not be fetched from `origin`.
    #[error("target branch '{branch}' does not exist or cannot be fetched: {source}")]
    FetchTarget {
        branch: String,
        #[source]
        source: GitError,
    },

    #[error("failed to create cherry-pick branch {branch}: {source}")]
    CreateBranch {
        branch: String,
        #[source]
        source: GitError,
    },

    /// The replay stopped; the cherry-pick was aborted afterwards.
    #[error("cherry-pick failed due to conflicts or other errors: {0}")]
    CherryPick(#[source] GitError),

    #[error("failed to push cherry-pick branch {branch}: {source}")]
    Push {
        branch: String,
        #[source]
        source: GitError,
    },

    /// No working tree could be prepared for the cherry-pick branch.
    #[error("failed to prepare worktree for {branch}: {source}")]
    Workspace {
        branch: String,
        #[source]
        source: GitError,
    },

    #[error("failed to create pull request: {0}")]
    CreatePr(#[source] GitHubApiError),

    /// The run was cancelled before this branch finished.
    #[error("cherry-pick cancelled")]
    Cancelled,

    /// The branch worker panicked or was aborted without reporting.
    #[error("branch worker terminated before reporting a result")]
    WorkerLost,
}

/// Coarse category of a [`CherryPickError`], reported in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any side effect.
    InvalidConfig,
    /// GitHub API failure.
    Remote,
    /// Git subprocess or worktree failure.
    Git,
    /// The source PR is not merged.
    NotMerged,
    Cancelled,
    /// The worker died without an outcome.
    Internal,
}

impl CherryPickError {
    /// Returns the category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            CherryPickError::InvalidConfig(_) => FailureKind::InvalidConfig,
            CherryPickError::FetchPr { .. } | CherryPickError::CreatePr(_) => FailureKind::Remote,
            CherryPickError::NotMerged { .. } => FailureKind::NotMerged,
            CherryPickError::ConfigureName(_)
            | CherryPickError::ConfigureEmail(_)
            | CherryPickError::FetchTarget { .. }
            | CherryPickError::CreateBranch { .. }
            | CherryPickError::CherryPick(_)
            | CherryPickError::Push { .. }
            | CherryPickError::Workspace { .. } => FailureKind::Git,
            CherryPickError::Cancelled => FailureKind::Cancelled,
            CherryPickError::WorkerLost => FailureKind::Internal,
        }
    }

    /// Returns true if re-running the same request later may succeed.
    ///
    /// Transient GitHub failures and cancellation qualify; conflicts and a
    /// missing target branch do not.
    pub fn is_retriable(&self) -> bool {
        match self {
            CherryPickError::FetchPr { source, .. } | CherryPickError::CreatePr(source) => {
                source.is_retriable()
            }
            CherryPickError::Cancelled | CherryPickError::WorkerLost => true,
            _ => false,
        }
    }
}

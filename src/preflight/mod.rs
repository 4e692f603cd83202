//! Preflight validation of cherry-pick requests.
//!
//! Before any GitHub call or git command, the bot checks that the request is
//! structurally usable. A request that fails here is answered with a usage
//! comment and no side effects.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::CherryPickRequest;

/// Error returned when a request fails preflight validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfig {
    /// The source PR number is zero.
    #[error("PR number is required")]
    MissingPrNumber,

    /// No target branches were given.
    #[error("at least one target branch is required")]
    NoTargetBranches,

    /// Owner or repository name is empty.
    #[error("repository owner and name are required")]
    MissingRepository,

    /// A target branch is empty or only whitespace.
    #[error("target branch names must not be empty")]
    BlankTargetBranch,

    /// The same target branch was requested twice.
    #[error("target branch '{0}' is listed more than once")]
    DuplicateTargetBranch(String),
}

/// Validates a request before any network or git activity.
///
/// Fails when the PR number is zero, the branch list is empty, the repository
/// owner or name is empty, or a branch is blank or repeated. Repeated branches
/// would map to the same cherry-pick branch and worktree.
pub fn validate_request(request: &CherryPickRequest) -> Result<(), InvalidConfig> {
    if request.pr.0 == 0 {
        return Err(InvalidConfig::MissingPrNumber);
    }

    if request.branches.is_empty() {
        return Err(InvalidConfig::NoTargetBranches);
    }

    if request.repo.owner.is_empty() || request.repo.repo.is_empty() {
        return Err(InvalidConfig::MissingRepository);
    }

    let mut seen = HashSet::new();
    for branch in &request.branches {
        if branch.trim().is_empty() {
            return Err(InvalidConfig::BlankTargetBranch);
        }
        if !seen.insert(branch.as_str()) {
            return Err(InvalidConfig::DuplicateTargetBranch(branch.clone()));
        }
    }

    Ok(())
}

//! Port traits for the remote repository and local git.
//!
//! The branch pipeline only talks to the outside world through these traits,
//! so tests substitute deterministic doubles for the octocrab client and the
//! git subprocess runner.

use std::future::Future;

use crate::git::GitResult;
use crate::github::GitHubApiError;
use crate::types::{CommentId, PrNumber, RepoId};

use super::git::GitEffect;
use super::github::{FollowUpPr, MergeInfo, NewFollowUp, Reaction};

/// Read and create pull requests on the code-hosting service.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct NeverMerged;
///
/// impl RemoteRepository for NeverMerged {
///     async fn get_change(&self, _: &RepoId, pr: PrNumber) -> Result<MergeInfo, GitHubApiError> {
///         Ok(MergeInfo { number: pr, state: "open".into(), status: MergeStatus::NotMerged })
///     }
///     // ...
/// }
/// ```
pub trait RemoteRepository {
    /// Fetch the merge state of a PR.
    fn get_change(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> impl Future<Output = Result<MergeInfo, GitHubApiError>> + Send;

    /// Find a PR in any state with head `<owner>:<head>` and base `base`.
    ///
    /// Returns `Ok(None)` when there is no such PR. If several match, the first
    /// one returned by the API wins.
    fn find_follow_up(
        &self,
        repo: &RepoId,
        head: &str,
        base: &str,
    ) -> impl Future<Output = Result<Option<FollowUpPr>, GitHubApiError>> + Send;

    /// Open a new PR.
    fn create_follow_up(
        &self,
        repo: &RepoId,
        pr: &NewFollowUp,
    ) -> impl Future<Output = Result<FollowUpPr, GitHubApiError>> + Send;
}

/// Post comments and reactions to the conversation that triggered a run.
pub trait CommentSink {
    /// Post a new comment on an issue or PR.
    fn post_comment(
        &self,
        repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;

    /// Add a reaction to an issue comment.
    fn add_reaction(
        &self,
        repo: &RepoId,
        comment_id: CommentId,
        reaction: Reaction,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;
}

/// Executes git effects against one working tree.
///
/// Implementations are constructed with a worktree path, so all effects
/// executed through a single interpreter instance operate on that worktree.
pub trait GitInterpreter {
    /// Run one git command. Returns the combined stdout/stderr on success.
    fn interpret(&self, effect: &GitEffect) -> impl Future<Output = GitResult<String>> + Send;
}

/// Hands out an isolated working tree per cherry-pick branch.
///
/// Every branch worker gets its own interpreter, so concurrent checkouts and
/// cherry-picks never share an index or HEAD.
pub trait GitWorkspaces {
    /// The interpreter bound to one working tree.
    type Git: GitInterpreter + Send + Sync;

    /// Prepare a clean working tree for `work_branch`.
    fn open(&self, work_branch: &str) -> impl Future<Output = GitResult<Self::Git>> + Send;

    /// Dispose of the working tree. Best-effort: failures are logged, not returned.
    fn release(&self, git: Self::Git, work_branch: &str) -> impl Future<Output = ()> + Send;

    /// Remove whatever an interrupted [`open`](GitWorkspaces::open) left behind
    /// for `work_branch`. Best-effort, like `release`.
    fn discard(&self, work_branch: &str) -> impl Future<Output = ()> + Send;
}

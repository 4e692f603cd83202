//! GitHub data exchanged with the remote-repository port.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, Sha};

/// GitHub reaction types used to acknowledge commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// +1 / thumbs up
    ThumbsUp,
}

impl Reaction {
    /// Returns the GitHub API content string for this reaction.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "+1",
        }
    }
}

/// Whether a PR has been merged, as reported by GitHub.
///
/// This is never inferred from other fields: `Unknown` means the API response
/// did not carry the `merged` flag at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeStatus {
    /// Merged; the merge commit is the one to replay.
    Merged { merge_commit_sha: Sha },

    /// Explicitly reported as not merged.
    NotMerged,

    /// GitHub did not report whether the PR is merged.
    Unknown,
}

impl MergeStatus {
    /// Returns the merge commit SHA if the PR was merged.
    pub fn merge_commit_sha(&self) -> Option<&Sha> {
        match self {
            MergeStatus::Merged { merge_commit_sha } => Some(merge_commit_sha),
            _ => None,
        }
    }
}

/// Merge state of the source PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeInfo {
    /// The PR number.
    pub number: PrNumber,
    /// Issue state as GitHub reports it (`open`, `closed`).
    pub state: String,
    /// Merge status, carrying the merge commit when merged.
    pub status: MergeStatus,
}

/// A follow-up PR carrying a cherry-pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPr {
    /// The PR number.
    pub number: PrNumber,
    /// The PR's web URL.
    pub url: String,
}

/// Parameters for opening a follow-up PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFollowUp {
    /// Head branch (in the same repository).
    pub head: String,
    /// Base branch the PR targets.
    pub base: String,
    pub title: String,
    pub body: String,
}

impl NewFollowUp {
    /// Builds the follow-up for cherry-picking `source` onto `target` from `head`.
    pub fn cherry_pick(source: PrNumber, target: &str, head: &str) -> Self {
        NewFollowUp {
            head: head.to_string(),
            base: target.to_string(),
            title: format!("Cherry-pick {} to {}", source, target),
            body: format!("Automatic cherry-pick of {} to `{}`", source, target),
        }
    }
}

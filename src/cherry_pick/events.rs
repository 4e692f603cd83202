//! Progress events emitted by the branch pipeline.
//!
//! The pipeline never logs directly. It reports each milestone to an injected
//! [`EventSink`], which production wires to `tracing` and tests replace with a
//! recorder.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::effects::{FollowUpPr, GitEffect};
use crate::types::{PrNumber, Sha};

/// A milestone in one branch's cherry-pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The branch worker started.
    Started { pr: PrNumber },

    /// The source PR is merged with this commit.
    MergeCommitFound { sha: Sha },

    /// Looking up an existing follow-up failed; the pipeline continues as if
    /// none existed.
    FollowUpLookupFailed { error: String },

    /// A follow-up PR for this branch already exists.
    FollowUpExists { pr: FollowUpPr },

    /// A git effect is about to run.
    GitStep { effect: GitEffect },

    /// `git cherry-pick --abort` failed after a failed cherry-pick.
    AbortFailed { error: String },

    /// The follow-up PR was opened.
    FollowUpCreated { pr: FollowUpPr },

    /// The branch ended in failure.
    Failed { error: String },
}

impl PipelineEvent {
    /// Short name of the event, matching its serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::Started { .. } => "started",
            PipelineEvent::MergeCommitFound { .. } => "merge_commit_found",
            PipelineEvent::FollowUpLookupFailed { .. } => "follow_up_lookup_failed",
            PipelineEvent::FollowUpExists { .. } => "follow_up_exists",
            PipelineEvent::GitStep { .. } => "git_step",
            PipelineEvent::AbortFailed { .. } => "abort_failed",
            PipelineEvent::FollowUpCreated { .. } => "follow_up_created",
            PipelineEvent::Failed { .. } => "failed",
        }
    }
}

/// Receives pipeline events. Shared by all branch workers.
pub trait EventSink: Send + Sync {
    /// Record an event for the given target branch.
    fn record(&self, branch: &str, event: &PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, branch: &str, event: &PipelineEvent) {
        match event {
            PipelineEvent::Started { pr } => {
                info!(branch, pr = %pr, "Starting cherry-pick");
            }
            PipelineEvent::MergeCommitFound { sha } => {
                info!(branch, sha = %sha.short(), "Found merge commit");
            }
            PipelineEvent::FollowUpLookupFailed { error } => {
                warn!(branch, error = %error, "Error checking for existing cherry-pick PR");
            }
            PipelineEvent::FollowUpExists { pr } => {
                info!(branch, pr = %pr.number, url = %pr.url, "Cherry-pick PR already exists");
            }
            PipelineEvent::GitStep { effect } => {
                debug!(branch, step = effect.name(), args = ?effect.args(), "Running git");
            }
            PipelineEvent::AbortFailed { error } => {
                warn!(branch, error = %error, "git cherry-pick --abort failed");
            }
            PipelineEvent::FollowUpCreated { pr } => {
                info!(branch, pr = %pr.number, url = %pr.url, "Cherry-pick PR created");
            }
            PipelineEvent::Failed { error } => {
                error!(branch, error = %error, "Cherry-pick failed");
            }
        }
    }
}

//! Per-branch outcomes and the run summary.

use serde::Serialize;

use crate::effects::FollowUpPr;

use super::error::{CherryPickError, FailureKind};

/// The result of cherry-picking onto one target branch.
#[derive(Debug)]
pub struct Outcome {
    /// The target branch this outcome belongs to.
    pub branch: String,

    /// What happened.
    pub result: OutcomeKind,
}

/// Exactly one of the three ways a branch can end.
#[derive(Debug)]
pub enum OutcomeKind {
    /// A follow-up PR for this branch was already open (or closed); nothing was done.
    AlreadyExists(FollowUpPr),

    /// The cherry-pick was pushed and a follow-up PR opened.
    Created(FollowUpPr),

    /// The branch failed.
    Failed(CherryPickError),
}

impl Outcome {
    pub fn new(branch: impl Into<String>, result: OutcomeKind) -> Self {
        Outcome {
            branch: branch.into(),
            result,
        }
    }

    /// Creates a failed outcome.
    pub fn failed(branch: impl Into<String>, error: CherryPickError) -> Self {
        Outcome::new(branch, OutcomeKind::Failed(error))
    }

    /// Returns true if the branch has a follow-up PR, new or existing.
    pub fn success(&self) -> bool {
        !matches!(self.result, OutcomeKind::Failed(_))
    }

    /// Returns the pre-existing follow-up PR, if that is how the branch ended.
    pub fn existing(&self) -> Option<&FollowUpPr> {
        match &self.result {
            OutcomeKind::AlreadyExists(pr) => Some(pr),
            _ => None,
        }
    }

    /// Returns the newly created follow-up PR, if that is how the branch ended.
    pub fn created(&self) -> Option<&FollowUpPr> {
        match &self.result {
            OutcomeKind::Created(pr) => Some(pr),
            _ => None,
        }
    }

    /// Returns the error, if the branch failed.
    pub fn error(&self) -> Option<&CherryPickError> {
        match &self.result {
            OutcomeKind::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the user-facing error text, if the branch failed.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Returns a serializable summary of this outcome.
    pub fn summary(&self) -> OutcomeSummary {
        let (status, pr) = match &self.result {
            OutcomeKind::AlreadyExists(pr) => (OutcomeStatus::AlreadyExists, Some(pr)),
            OutcomeKind::Created(pr) => (OutcomeStatus::Created, Some(pr)),
            OutcomeKind::Failed(_) => (OutcomeStatus::Failed, None),
        };

        OutcomeSummary {
            branch: self.branch.clone(),
            status,
            pr_number: pr.map(|p| p.number.0),
            url: pr.map(|p| p.url.clone()),
            error: self.error_message(),
            failure: self.error().map(CherryPickError::kind),
            retriable: self.error().map(CherryPickError::is_retriable),
        }
    }
}

/// Status field of an [`OutcomeSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    AlreadyExists,
    Created,
    Failed,
}

/// Machine-readable form of an [`Outcome`], printed one per line by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub branch: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Category of the failure, for automation that routes on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriable: Option<bool>,
}

/// Returns true if the run should exit non-zero: some branch failed.
///
/// An existing follow-up PR is not a failure.
pub fn requires_failure_exit(outcomes: &[Outcome]) -> bool {
    outcomes.iter().any(|o| !o.success())
}

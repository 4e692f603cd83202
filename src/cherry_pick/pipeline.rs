//! The per-branch cherry-pick state machine.
//!
//! For one target branch the pipeline runs, stopping at the first failure or
//! short-circuit:
//!
//! 1. Fetch the source PR's merge state; anything but merged fails.
//! 2. Look for an existing follow-up PR on the deterministic branch; if found,
//!    stop with `AlreadyExists`. A lookup error only produces a warning.
//! 3. Replay the merge commit in a fresh worktree: set identity, fetch the
//!    target, check out the cherry-pick branch, cherry-pick, push. A failed
//!    cherry-pick is followed by `git cherry-pick --abort`.
//! 4. Open the follow-up PR.
//!
//! Every port call is raced against the cancellation token.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::effects::{
    GitEffect, GitInterpreter, GitWorkspaces, MergeStatus, NewFollowUp, RemoteRepository,
};
use crate::git::GitError;
use crate::types::{CherryPickRequest, Sha};

use super::cherry_pick_branch_name;
use super::error::CherryPickError;
use super::events::{EventSink, PipelineEvent};
use super::outcome::{Outcome, OutcomeKind};

/// One branch's run through the state machine.
///
/// Borrows everything it needs from the coordinator; owns only the outcome it
/// produces.
pub(crate) struct BranchPipeline<'a, R, W> {
    pub(crate) remote: &'a R,
    pub(crate) workspaces: &'a W,
    pub(crate) events: &'a dyn EventSink,
    pub(crate) request: &'a CherryPickRequest,
    pub(crate) target: &'a str,
    pub(crate) cancel: &'a CancellationToken,
}

impl<R, W> BranchPipeline<'_, R, W>
where
    R: RemoteRepository + Sync,
    W: GitWorkspaces + Sync,
{
    /// Runs the pipeline to completion. Never fails: errors become a `Failed` outcome.
    pub(crate) async fn run(&self) -> Outcome {
        self.emit(PipelineEvent::Started {
            pr: self.request.pr,
        });

        let result = match self.execute().await {
            Ok(kind) => kind,
            Err(e) => {
                self.emit(PipelineEvent::Failed {
                    error: e.to_string(),
                });
                OutcomeKind::Failed(e)
            }
        };

        Outcome::new(self.target, result)
    }

    async fn execute(&self) -> Result<OutcomeKind, CherryPickError> {
        let request = self.request;

        let info = self
            .guard(self.remote.get_change(&request.repo, request.pr))
            .await?
            .map_err(|source| CherryPickError::FetchPr {
                pr: request.pr,
                source,
            })?;

        let merge_commit_sha = match info.status {
            MergeStatus::Merged { merge_commit_sha } => merge_commit_sha,
            MergeStatus::NotMerged | MergeStatus::Unknown => {
                return Err(CherryPickError::NotMerged {
                    pr: request.pr,
                    state: info.state,
                });
            }
        };
        self.emit(PipelineEvent::MergeCommitFound {
            sha: merge_commit_sha.clone(),
        });

        let work_branch = cherry_pick_branch_name(request.pr, self.target);

        match self
            .guard(
                self.remote
                    .find_follow_up(&request.repo, &work_branch, self.target),
            )
            .await?
        {
            Ok(Some(existing)) => {
                self.emit(PipelineEvent::FollowUpExists {
                    pr: existing.clone(),
                });
                return Ok(OutcomeKind::AlreadyExists(existing));
            }
            Ok(None) => {}
            Err(e) => self.emit(PipelineEvent::FollowUpLookupFailed {
                error: e.to_string(),
            }),
        }

        self.replay(&work_branch, &merge_commit_sha).await?;

        let new_pr = NewFollowUp::cherry_pick(request.pr, self.target, &work_branch);
        let created = self
            .guard(self.remote.create_follow_up(&request.repo, &new_pr))
            .await?
            .map_err(CherryPickError::CreatePr)?;

        self.emit(PipelineEvent::FollowUpCreated {
            pr: created.clone(),
        });
        Ok(OutcomeKind::Created(created))
    }

    /// Opens a worktree, runs the git sequence in it and releases it again,
    /// whatever the sequence returned.
    async fn replay(&self, work_branch: &str, commit: &Sha) -> Result<(), CherryPickError> {
        let opened = match self.guard(self.workspaces.open(work_branch)).await {
            Ok(opened) => opened,
            Err(cancelled) => {
                // `open` was dropped part-way; its worktree may be half created.
                self.workspaces.discard(work_branch).await;
                return Err(cancelled);
            }
        };
        let git = opened.map_err(|source| CherryPickError::Workspace {
            branch: work_branch.to_string(),
            source,
        })?;

        let result = self.replay_in(&git, work_branch, commit).await;
        self.workspaces.release(git, work_branch).await;
        result
    }

    async fn replay_in(
        &self,
        git: &W::Git,
        work_branch: &str,
        commit: &Sha,
    ) -> Result<(), CherryPickError> {
        let identity = &self.request.identity;

        self.step(
            git,
            GitEffect::ConfigUserName {
                name: identity.name.clone(),
            },
        )
        .await?
        .map_err(CherryPickError::ConfigureName)?;

        self.step(
            git,
            GitEffect::ConfigUserEmail {
                email: identity.email.clone(),
            },
        )
        .await?
        .map_err(CherryPickError::ConfigureEmail)?;

        self.step(
            git,
            GitEffect::Fetch {
                branch: self.target.to_string(),
            },
        )
        .await?
        .map_err(|source| CherryPickError::FetchTarget {
            branch: self.target.to_string(),
            source,
        })?;

        self.step(
            git,
            GitEffect::CheckoutNewBranch {
                branch: work_branch.to_string(),
                start_point: format!("origin/{}", self.target),
            },
        )
        .await?
        .map_err(|source| CherryPickError::CreateBranch {
            branch: work_branch.to_string(),
            source,
        })?;

        let picked = self
            .step(
                git,
                GitEffect::CherryPick {
                    commit: commit.clone(),
                    mainline: 1,
                },
            )
            .await?;
        if let Err(e) = picked {
            self.abort_cherry_pick(git).await;
            return Err(CherryPickError::CherryPick(e));
        }

        self.step(
            git,
            GitEffect::Push {
                branch: work_branch.to_string(),
            },
        )
        .await?
        .map_err(|source| CherryPickError::Push {
            branch: work_branch.to_string(),
            source,
        })?;

        Ok(())
    }

    /// Restores the worktree after a failed cherry-pick.
    ///
    /// Runs even if cancellation was requested meanwhile. Its own failure is
    /// reported as an event and otherwise ignored.
    async fn abort_cherry_pick(&self, git: &W::Git) {
        let effect = GitEffect::CherryPickAbort;
        self.emit(PipelineEvent::GitStep {
            effect: effect.clone(),
        });
        if let Err(e) = git.interpret(&effect).await {
            self.emit(PipelineEvent::AbortFailed {
                error: e.to_string(),
            });
        }
    }

    /// Runs one git effect under the cancellation guard.
    async fn step(
        &self,
        git: &W::Git,
        effect: GitEffect,
    ) -> Result<Result<String, GitError>, CherryPickError> {
        self.emit(PipelineEvent::GitStep {
            effect: effect.clone(),
        });
        self.guard(git.interpret(&effect)).await
    }

    /// Races `fut` against cancellation. Cancellation wins ties.
    async fn guard<T>(&self, fut: impl Future<Output = T>) -> Result<T, CherryPickError> {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(CherryPickError::Cancelled),
            out = fut => Ok(out),
        }
    }

    fn emit(&self, event: PipelineEvent) {
        self.events.record(self.target, &event);
    }
}

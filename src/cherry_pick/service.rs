//! Fan-out across target branches.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::effects::{GitWorkspaces, RemoteRepository};
use crate::preflight::validate_request;
use crate::types::CherryPickRequest;

use super::error::CherryPickError;
use super::events::{EventSink, TracingSink};
use super::outcome::Outcome;
use super::pipeline::BranchPipeline;

/// Runs the branch pipeline for every target branch of a request.
///
/// Cloning is cheap: the ports are shared behind `Arc`.
pub struct CherryPickService<R, W> {
    remote: Arc<R>,
    workspaces: Arc<W>,
    events: Arc<dyn EventSink>,
}

impl<R, W> Clone for CherryPickService<R, W> {
    fn clone(&self) -> Self {
        CherryPickService {
            remote: Arc::clone(&self.remote),
            workspaces: Arc::clone(&self.workspaces),
            events: Arc::clone(&self.events),
        }
    }
}

impl<R, W> CherryPickService<R, W>
where
    R: RemoteRepository + Send + Sync + 'static,
    W: GitWorkspaces + Send + Sync + 'static,
{
    /// Creates a service that reports progress through `tracing`.
    pub fn new(remote: R, workspaces: W) -> Self {
        CherryPickService {
            remote: Arc::new(remote),
            workspaces: Arc::new(workspaces),
            events: Arc::new(TracingSink),
        }
    }

    /// Replaces the event sink.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Cherry-picks the request's PR onto a single target branch.
    pub async fn process_branch(
        &self,
        request: &CherryPickRequest,
        target: &str,
        cancel: &CancellationToken,
    ) -> Outcome {
        BranchPipeline {
            remote: self.remote.as_ref(),
            workspaces: self.workspaces.as_ref(),
            events: self.events.as_ref(),
            request,
            target,
            cancel,
        }
        .run()
        .await
    }

    /// Validates the request, then cherry-picks onto every target branch.
    ///
    /// An invalid request is rejected before any port is called.
    pub async fn process_request(
        &self,
        request: Arc<CherryPickRequest>,
        cancel: CancellationToken,
    ) -> Result<Vec<Outcome>, CherryPickError> {
        validate_request(&request)?;
        Ok(self.process_branches(request, cancel).await)
    }

    /// Cherry-picks onto every target branch concurrently.
    ///
    /// Returns one outcome per branch, with `outcomes[i]` for
    /// `request.branches[i]` whatever order the workers finish in. A worker
    /// that panics yields a `Failed` outcome for its own branch only.
    ///
    /// Dropping the returned future cancels and aborts all workers.
    pub async fn process_branches(
        &self,
        request: Arc<CherryPickRequest>,
        cancel: CancellationToken,
    ) -> Vec<Outcome> {
        let cancel = cancel.child_token();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let mut workers = JoinSet::new();
        for (index, target) in request.branches.iter().cloned().enumerate() {
            let service = self.clone();
            let request = Arc::clone(&request);
            let cancel = cancel.clone();
            workers.spawn(async move {
                let outcome = service.process_branch(&request, &target, &cancel).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Outcome>> = std::iter::repeat_with(|| None)
            .take(request.branches.len())
            .collect();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    debug!(branch = %outcome.branch, success = outcome.success(), "Branch worker finished");
                    slots[index] = Some(outcome);
                }
                Err(e) => warn!(error = %e, "Branch worker terminated without an outcome"),
            }
        }

        request
            .branches
            .iter()
            .zip(slots)
            .map(|(branch, slot)| {
                slot.unwrap_or_else(|| Outcome::failed(branch.clone(), CherryPickError::WorkerLost))
            })
            .collect()
    }
}

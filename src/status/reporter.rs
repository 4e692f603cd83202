//! Delivers results to the conversation that triggered the run.

use tracing::{info, warn};

use crate::cherry_pick::Outcome;
use crate::effects::{CommentSink, Reaction};
use crate::types::{CommentId, PrNumber, RepoId};

use super::format::{format_outcome, format_usage_error};

/// Posts acknowledgements and result comments.
///
/// Every method is a no-op without a destination: comments need an issue
/// number, reactions need a comment id. Delivery failures are logged and
/// never returned, since the cherry-picks themselves already happened.
pub struct StatusReporter<C> {
    sink: C,
    repo: RepoId,
    issue: Option<PrNumber>,
}

impl<C: CommentSink> StatusReporter<C> {
    pub fn new(sink: C, repo: RepoId, issue: Option<PrNumber>) -> Self {
        StatusReporter { sink, repo, issue }
    }

    /// Reacts with 👍 to the triggering comment.
    pub async fn acknowledge(&self, comment_id: Option<CommentId>) {
        let Some(comment_id) = comment_id else {
            return;
        };
        if let Err(e) = self
            .sink
            .add_reaction(&self.repo, comment_id, Reaction::ThumbsUp)
            .await
        {
            warn!(comment_id = %comment_id, error = %e, "Failed to add reaction");
        }
    }

    /// Explains a rejected request, with usage examples.
    pub async fn post_usage_error(&self, message: &str) {
        let Some(issue) = self.issue else {
            return;
        };
        if let Err(e) = self
            .sink
            .post_comment(&self.repo, issue, &format_usage_error(message))
            .await
        {
            warn!(issue = %issue, error = %e, "Failed to post error comment");
        }
    }

    /// Posts one comment per outcome, in order. A failed post does not stop
    /// the remaining ones.
    pub async fn post_outcomes(&self, outcomes: &[Outcome]) {
        let Some(issue) = self.issue else {
            return;
        };
        for outcome in outcomes {
            match self
                .sink
                .post_comment(&self.repo, issue, &format_outcome(outcome))
                .await
            {
                Ok(()) => info!(issue = %issue, branch = %outcome.branch, "Posted result comment"),
                Err(e) => warn!(
                    issue = %issue,
                    branch = %outcome.branch,
                    error = %e,
                    "Error posting result comment"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cherry_pick::{CherryPickError, OutcomeKind};
    use crate::effects::FollowUpPr;
    use crate::test_utils::MockComments;

    fn reporter(sink: &MockComments, issue: Option<u64>) -> StatusReporter<MockComments> {
        StatusReporter::new(
            sink.clone(),
            RepoId::new("owner", "repo"),
            issue.map(PrNumber),
        )
    }

    fn outcomes() -> Vec<Outcome> {
        vec![
            Outcome::new(
                "release-1.0",
                OutcomeKind::Created(FollowUpPr {
                    number: PrNumber(101),
                    url: "https://github.com/owner/repo/pull/101".to_string(),
                }),
            ),
            Outcome::failed("release-2.0", CherryPickError::Cancelled),
            Outcome::new(
                "release-3.0",
                OutcomeKind::AlreadyExists(FollowUpPr {
                    number: PrNumber(99),
                    url: "https://github.com/owner/repo/pull/99".to_string(),
                }),
            ),
        ]
    }

    #[tokio::test]
    async fn posts_one_comment_per_outcome_in_order() {
        let sink = MockComments::new();
        reporter(&sink, Some(42)).post_outcomes(&outcomes()).await;

        let comments = sink.comments();
        assert_eq!(comments.len(), 3);
        assert!(comments.iter().all(|(issue, _)| *issue == PrNumber(42)));
        assert!(comments[0].1.contains("`release-1.0` successful!"));
        assert!(comments[1].1.contains("`release-2.0` failed!"));
        assert!(comments[2].1.contains("`release-3.0` already exists!"));
    }

    #[tokio::test]
    async fn failed_post_does_not_stop_the_rest() {
        let sink = MockComments::new().failing_posts_containing("release-2.0");
        reporter(&sink, Some(42)).post_outcomes(&outcomes()).await;

        let comments = sink.comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[1].1.contains("release-3.0"));
    }

    #[tokio::test]
    async fn no_issue_means_no_comments() {
        let sink = MockComments::new();
        let reporter = reporter(&sink, None);

        reporter.post_outcomes(&outcomes()).await;
        reporter.post_usage_error("PR number is required").await;

        assert!(sink.comments().is_empty());
    }

    #[tokio::test]
    async fn usage_error_is_posted() {
        let sink = MockComments::new();
        reporter(&sink, Some(7))
            .post_usage_error("at least one target branch is required")
            .await;

        let comments = sink.comments();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].1.contains("**Usage**"));
    }

    #[tokio::test]
    async fn acknowledge_reacts_thumbs_up() {
        let sink = MockComments::new();
        reporter(&sink, None)
            .acknowledge(Some(CommentId(555)))
            .await;

        assert_eq!(
            sink.reactions(),
            vec![(CommentId(555), Reaction::ThumbsUp)]
        );
    }

    #[tokio::test]
    async fn acknowledge_without_comment_is_noop() {
        let sink = MockComments::new();
        reporter(&sink, Some(42)).acknowledge(None).await;
        assert!(sink.reactions().is_empty());
    }

    #[tokio::test]
    async fn reaction_failure_is_not_fatal() {
        let sink = MockComments::new().with_reaction_error();
        reporter(&sink, Some(42))
            .acknowledge(Some(CommentId(1)))
            .await;
        assert!(sink.reactions().is_empty());
    }
}

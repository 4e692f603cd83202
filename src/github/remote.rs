//! Remote-repository and comment ports implemented with octocrab.
//!
//! Each call is a single attempt. Failures are categorized by
//! [`GitHubApiError::from_octocrab`] and returned to the caller unchanged.

use serde::Serialize;

use crate::effects::{
    CommentSink, FollowUpPr, MergeInfo, MergeStatus, NewFollowUp, Reaction, RemoteRepository,
};
use crate::types::{CommentId, PrNumber, RepoId, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Converts an octocrab pull request into the port's follow-up reference.
fn follow_up_from(pull: &octocrab::models::pulls::PullRequest) -> FollowUpPr {
    FollowUpPr {
        number: PrNumber(pull.number),
        url: pull
            .html_url
            .as_ref()
            .map(|url| url.to_string())
            .unwrap_or_default(),
    }
}

fn issue_state_str(state: Option<&octocrab::models::IssueState>) -> &'static str {
    match state {
        Some(octocrab::models::IssueState::Open) => "open",
        Some(octocrab::models::IssueState::Closed) => "closed",
        _ => "unknown",
    }
}

/// Maps GitHub's explicit `merged` flag to a [`MergeStatus`].
///
/// A merged PR without a merge commit SHA is reported as a transient error:
/// GitHub populates `merge_commit_sha` shortly after the merge.
fn merge_status(
    pr: PrNumber,
    merged: Option<bool>,
    merge_commit_sha: Option<&str>,
) -> Result<MergeStatus, GitHubApiError> {
    match merged {
        Some(true) => {
            let sha = merge_commit_sha.ok_or_else(|| {
                GitHubApiError::transient_without_source(format!(
                    "PR {} is merged but merge_commit_sha not yet available",
                    pr
                ))
            })?;
            let merge_commit_sha = Sha::parse(sha).map_err(|e| {
                GitHubApiError::permanent_without_source(format!(
                    "Invalid merge commit SHA: {}",
                    e
                ))
            })?;
            Ok(MergeStatus::Merged { merge_commit_sha })
        }
        Some(false) => Ok(MergeStatus::NotMerged),
        None => Ok(MergeStatus::Unknown),
    }
}

impl RemoteRepository for OctocrabClient {
    async fn get_change(&self, repo: &RepoId, pr: PrNumber) -> Result<MergeInfo, GitHubApiError> {
        let pull = self
            .inner()
            .pulls(&repo.owner, &repo.repo)
            .get(pr.0)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(MergeInfo {
            number: pr,
            state: issue_state_str(pull.state.as_ref()).to_string(),
            status: merge_status(pr, pull.merged, pull.merge_commit_sha.as_deref())?,
        })
    }

    async fn find_follow_up(
        &self,
        repo: &RepoId,
        head: &str,
        base: &str,
    ) -> Result<Option<FollowUpPr>, GitHubApiError> {
        let page = self
            .inner()
            .pulls(&repo.owner, &repo.repo)
            .list()
            .state(octocrab::params::State::All)
            .head(format!("{}:{}", repo.owner, head))
            .base(base)
            .per_page(1u8)
            .send()
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(page.items.first().map(follow_up_from))
    }

    async fn create_follow_up(
        &self,
        repo: &RepoId,
        pr: &NewFollowUp,
    ) -> Result<FollowUpPr, GitHubApiError> {
        let pull = self
            .inner()
            .pulls(&repo.owner, &repo.repo)
            .create(&pr.title, &pr.head, &pr.base)
            .body(&pr.body)
            .send()
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(follow_up_from(&pull))
    }
}

impl CommentSink for OctocrabClient {
    async fn post_comment(
        &self,
        repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> Result<(), GitHubApiError> {
        self.inner()
            .issues(&repo.owner, &repo.repo)
            .create_comment(issue.0, body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        repo: &RepoId,
        comment_id: CommentId,
        reaction: Reaction,
    ) -> Result<(), GitHubApiError> {
        let url = format!(
            "/repos/{}/{}/issues/comments/{}/reactions",
            repo.owner, repo.repo, comment_id.0
        );

        #[derive(Serialize)]
        struct ReactionRequest {
            content: &'static str,
        }

        let _: serde_json::Value = self
            .inner()
            .post(
                &url,
                Some(&ReactionRequest {
                    content: reaction.as_api_str(),
                }),
            )
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }
}

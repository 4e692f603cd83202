//! Shared test doubles and arbitrary generators.
//!
//! The doubles record every call so tests can assert on exactly which GitHub
//! and git operations a pipeline issued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use crate::cherry_pick::{EventSink, PipelineEvent};
use crate::effects::{
    CommentSink, FollowUpPr, GitEffect, GitInterpreter, GitWorkspaces, MergeInfo, MergeStatus,
    NewFollowUp, Reaction, RemoteRepository,
};
use crate::git::{GitError, GitResult};
use crate::github::GitHubApiError;
use crate::types::{CherryPickRequest, CommentId, CommitIdentity, PrNumber, RepoId, Sha};

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    (1u64..=u64::MAX).prop_map(PrNumber)
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(|s| Sha::parse(s).unwrap())
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/-]{0,50}".prop_map(String::from)
}

pub fn make_sha(n: u64) -> Sha {
    Sha::parse(format!("{:0>40x}", n)).unwrap()
}

/// A valid request for PR #42 in `owner/repo`.
pub fn test_request(branches: &[&str]) -> CherryPickRequest {
    CherryPickRequest {
        pr: PrNumber(42),
        repo: RepoId::new("owner", "repo"),
        branches: branches.iter().map(|b| b.to_string()).collect(),
        identity: CommitIdentity::new("Cherry-pick bot", "bot@example.com"),
    }
}

fn simulated_git_failure(effect: &GitEffect) -> GitError {
    GitError::CommandFailed {
        command: format!("git {}", effect.args().join(" ")),
        output: "error: simulated failure".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Remote repository
// ─────────────────────────────────────────────────────────────────────────────

/// What `get_change` answers.
#[derive(Debug, Clone)]
pub enum ChangeReply {
    Merged(Sha),
    NotMerged,
    Unknown,
    Error,
}

#[derive(Debug, Default)]
struct RemoteState {
    follow_ups: Vec<(String, String, FollowUpPr)>,
    created: Vec<NewFollowUp>,
    get_calls: usize,
    lookup_calls: usize,
    next_number: u64,
}

/// In-memory GitHub. Created follow-ups are visible to later lookups, so a
/// second run against the same mock sees the first run's PRs.
#[derive(Debug, Clone)]
pub struct MockRemote {
    change: ChangeReply,
    lookup_fails: bool,
    create_fails: bool,
    panic_on: Option<String>,
    hang_on: Option<String>,
    delays: HashMap<String, Duration>,
    state: Arc<Mutex<RemoteState>>,
}

impl MockRemote {
    pub fn new(change: ChangeReply) -> Self {
        MockRemote {
            change,
            lookup_fails: false,
            create_fails: false,
            panic_on: None,
            hang_on: None,
            delays: HashMap::new(),
            state: Arc::new(Mutex::new(RemoteState::default())),
        }
    }

    /// A remote where the source PR is merged with `make_sha(1)`.
    pub fn merged() -> Self {
        MockRemote::new(ChangeReply::Merged(make_sha(1)))
    }

    /// Seeds an existing follow-up PR for `head` into `base`.
    pub fn with_existing(self, head: &str, base: &str, number: u64) -> Self {
        self.state.lock().unwrap().follow_ups.push((
            head.to_string(),
            base.to_string(),
            FollowUpPr {
                number: PrNumber(number),
                url: format!("https://github.com/owner/repo/pull/{}", number),
            },
        ));
        self
    }

    pub fn with_lookup_error(mut self) -> Self {
        self.lookup_fails = true;
        self
    }

    pub fn with_create_error(mut self) -> Self {
        self.create_fails = true;
        self
    }

    /// Panics inside the follow-up lookup for `base`.
    pub fn panicking_on(mut self, base: &str) -> Self {
        self.panic_on = Some(base.to_string());
        self
    }

    /// Never answers the follow-up lookup for `base`.
    pub fn hanging_on(mut self, base: &str) -> Self {
        self.hang_on = Some(base.to_string());
        self
    }

    /// Delays the follow-up lookup for `base`.
    pub fn with_delay(mut self, base: &str, delay: Duration) -> Self {
        self.delays.insert(base.to_string(), delay);
        self
    }

    pub fn created(&self) -> Vec<NewFollowUp> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn get_calls(&self) -> usize {
        self.state.lock().unwrap().get_calls
    }

    pub fn lookup_calls(&self) -> usize {
        self.state.lock().unwrap().lookup_calls
    }
}

impl RemoteRepository for MockRemote {
    async fn get_change(&self, _repo: &RepoId, pr: PrNumber) -> Result<MergeInfo, GitHubApiError> {
        self.state.lock().unwrap().get_calls += 1;

        let (state, status) = match &self.change {
            ChangeReply::Merged(sha) => (
                "closed",
                MergeStatus::Merged {
                    merge_commit_sha: sha.clone(),
                },
            ),
            ChangeReply::NotMerged => ("open", MergeStatus::NotMerged),
            ChangeReply::Unknown => ("closed", MergeStatus::Unknown),
            ChangeReply::Error => {
                return Err(GitHubApiError::permanent_without_source("Not Found"));
            }
        };

        Ok(MergeInfo {
            number: pr,
            state: state.to_string(),
            status,
        })
    }

    async fn find_follow_up(
        &self,
        _repo: &RepoId,
        head: &str,
        base: &str,
    ) -> Result<Option<FollowUpPr>, GitHubApiError> {
        if let Some(delay) = self.delays.get(base) {
            tokio::time::sleep(*delay).await;
        }
        if self.hang_on.as_deref() == Some(base) {
            std::future::pending::<()>().await;
        }
        if self.panic_on.as_deref() == Some(base) {
            panic!("simulated panic while looking up {}", base);
        }

        let mut state = self.state.lock().unwrap();
        state.lookup_calls += 1;
        if self.lookup_fails {
            return Err(GitHubApiError::transient_without_source(
                "connection reset by peer",
            ));
        }
        Ok(state
            .follow_ups
            .iter()
            .find(|(h, b, _)| h == head && b == base)
            .map(|(_, _, pr)| pr.clone()))
    }

    async fn create_follow_up(
        &self,
        repo: &RepoId,
        pr: &NewFollowUp,
    ) -> Result<FollowUpPr, GitHubApiError> {
        let mut state = self.state.lock().unwrap();
        if self.create_fails {
            return Err(GitHubApiError::permanent_without_source(
                "Validation Failed",
            ));
        }

        state.next_number += 1;
        let number = 1000 + state.next_number;
        let created = FollowUpPr {
            number: PrNumber(number),
            url: format!(
                "https://github.com/{}/{}/pull/{}",
                repo.owner, repo.repo, number
            ),
        };
        state
            .follow_ups
            .push((pr.head.clone(), pr.base.clone(), created.clone()));
        state.created.push(pr.clone());
        Ok(created)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Git
// ─────────────────────────────────────────────────────────────────────────────

type FailWhen = Arc<dyn Fn(&str, &GitEffect) -> bool + Send + Sync>;

/// Interpreter handed out by [`MockWorkspaces`]; records effects per work branch.
#[derive(Clone)]
pub struct RecordingGit {
    work_branch: String,
    log: Arc<Mutex<Vec<(String, GitEffect)>>>,
    fail_when: FailWhen,
}

impl GitInterpreter for RecordingGit {
    async fn interpret(&self, effect: &GitEffect) -> GitResult<String> {
        self.log
            .lock()
            .unwrap()
            .push((self.work_branch.clone(), effect.clone()));

        if (self.fail_when)(&self.work_branch, effect) {
            Err(simulated_git_failure(effect))
        } else {
            Ok(String::new())
        }
    }
}

/// Workspace pool that never touches disk.
#[derive(Clone)]
pub struct MockWorkspaces {
    log: Arc<Mutex<Vec<(String, GitEffect)>>>,
    opened: Arc<Mutex<Vec<String>>>,
    released: Arc<Mutex<Vec<String>>>,
    discarded: Arc<Mutex<Vec<String>>>,
    fail_when: FailWhen,
    open_fails: bool,
    open_hangs: bool,
}

impl Default for MockWorkspaces {
    fn default() -> Self {
        MockWorkspaces {
            log: Arc::default(),
            opened: Arc::default(),
            released: Arc::default(),
            discarded: Arc::default(),
            fail_when: Arc::new(|_, _| false),
            open_fails: false,
            open_hangs: false,
        }
    }
}

impl MockWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every effect for which `pred(work_branch, effect)` holds.
    pub fn failing_when(
        pred: impl Fn(&str, &GitEffect) -> bool + Send + Sync + 'static,
    ) -> Self {
        MockWorkspaces {
            fail_when: Arc::new(pred),
            ..Self::default()
        }
    }

    pub fn with_open_error(mut self) -> Self {
        self.open_fails = true;
        self
    }

    /// `open` never completes, as if `git worktree add` were stuck.
    pub fn with_hanging_open(mut self) -> Self {
        self.open_hangs = true;
        self
    }

    /// All effects across work branches, in issue order.
    pub fn effects(&self) -> Vec<GitEffect> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Effects issued in the worktree of `work_branch`.
    pub fn effects_for(&self, work_branch: &str) -> Vec<GitEffect> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _)| b == work_branch)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    pub fn discarded(&self) -> Vec<String> {
        self.discarded.lock().unwrap().clone()
    }
}

impl GitWorkspaces for MockWorkspaces {
    type Git = RecordingGit;

    async fn open(&self, work_branch: &str) -> GitResult<RecordingGit> {
        if self.open_fails {
            return Err(GitError::WorktreeError {
                details: "simulated worktree failure".to_string(),
            });
        }
        if self.open_hangs {
            return std::future::pending().await;
        }
        self.opened.lock().unwrap().push(work_branch.to_string());
        Ok(RecordingGit {
            work_branch: work_branch.to_string(),
            log: Arc::clone(&self.log),
            fail_when: Arc::clone(&self.fail_when),
        })
    }

    async fn release(&self, _git: RecordingGit, work_branch: &str) {
        self.released.lock().unwrap().push(work_branch.to_string());
    }

    async fn discard(&self, work_branch: &str) {
        self.discarded.lock().unwrap().push(work_branch.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events and comments
// ─────────────────────────────────────────────────────────────────────────────

/// Event sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, PipelineEvent)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(String, PipelineEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Event names recorded for `branch`, in order.
    pub fn names_for(&self, branch: &str) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _)| b == branch)
            .map(|(_, e)| e.name())
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, branch: &str, event: &PipelineEvent) {
        self.events
            .lock()
            .unwrap()
            .push((branch.to_string(), event.clone()));
    }
}

/// Comment sink that records posts and reactions.
#[derive(Debug, Clone, Default)]
pub struct MockComments {
    comments: Arc<Mutex<Vec<(PrNumber, String)>>>,
    reactions: Arc<Mutex<Vec<(CommentId, Reaction)>>>,
    fail_posts_containing: Option<String>,
    reactions_fail: bool,
}

impl MockComments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any comment whose body contains `needle`.
    pub fn failing_posts_containing(mut self, needle: &str) -> Self {
        self.fail_posts_containing = Some(needle.to_string());
        self
    }

    pub fn with_reaction_error(mut self) -> Self {
        self.reactions_fail = true;
        self
    }

    pub fn comments(&self) -> Vec<(PrNumber, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<(CommentId, Reaction)> {
        self.reactions.lock().unwrap().clone()
    }
}

impl CommentSink for MockComments {
    async fn post_comment(
        &self,
        _repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> Result<(), GitHubApiError> {
        if let Some(needle) = &self.fail_posts_containing
            && body.contains(needle.as_str())
        {
            return Err(GitHubApiError::transient_without_source("502 Bad Gateway"));
        }
        self.comments
            .lock()
            .unwrap()
            .push((issue, body.to_string()));
        Ok(())
    }

    async fn add_reaction(
        &self,
        _repo: &RepoId,
        comment_id: CommentId,
        reaction: Reaction,
    ) -> Result<(), GitHubApiError> {
        if self.reactions_fail {
            return Err(GitHubApiError::permanent_without_source(
                "Resource not accessible by integration",
            ));
        }
        self.reactions.lock().unwrap().push((comment_id, reaction));
        Ok(())
    }
}

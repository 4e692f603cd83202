use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cherry_pick_bot::cherry_pick::{CherryPickService, requires_failure_exit};
use cherry_pick_bot::commands::parse_cherry_pick_command;
use cherry_pick_bot::git::WorktreePool;
use cherry_pick_bot::github::OctocrabClient;
use cherry_pick_bot::preflight::validate_request;
use cherry_pick_bot::status::StatusReporter;
use cherry_pick_bot::types::{CherryPickRequest, CommentId, CommitIdentity, PrNumber, RepoId};

/// Cherry-pick a merged pull request onto one or more branches.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// PR number to cherry-pick.
    #[arg(long, default_value_t = 0)]
    pr_number: u64,

    /// Comma-separated list of target branches.
    #[arg(long, conflicts_with = "comment_body")]
    branches: Option<String>,

    /// Comment text containing a `/cherry-pick <branch>...` command.
    #[arg(long)]
    comment_body: Option<String>,

    /// Repository in owner/name format.
    #[arg(long)]
    repo: RepoId,

    /// Comment ID to acknowledge with a reaction.
    #[arg(long)]
    comment_id: Option<u64>,

    /// Issue/PR number to post results on.
    #[arg(long)]
    issue_number: Option<u64>,

    /// Git user name for the cherry-pick commits.
    #[arg(long, default_value = "Cherry-pick bot")]
    git_user_name: String,

    /// Git user email for the cherry-pick commits.
    #[arg(long, default_value = "cherry-pick-bot@users.noreply.github.com")]
    git_user_email: String,

    /// Clone of the repository, with an `origin` remote to fetch from and push to.
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Directory for per-branch worktrees (default: a directory under the system temp dir).
    #[arg(long)]
    worktree_dir: Option<PathBuf>,

    /// GitHub token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,
}

impl Cli {
    /// Target branches from `--branches`, or from the command in `--comment-body`.
    fn target_branches(&self) -> Vec<String> {
        if let Some(branches) = &self.branches {
            return branches
                .split(',')
                .map(|b| b.trim().to_string())
                .collect();
        }
        self.comment_body
            .as_deref()
            .and_then(parse_cherry_pick_command)
            .map(|cmd| cmd.branches)
            .unwrap_or_default()
    }

    fn request(&self) -> CherryPickRequest {
        CherryPickRequest {
            pr: PrNumber(self.pr_number),
            repo: self.repo.clone(),
            branches: self.target_branches(),
            identity: CommitIdentity::new(&self.git_user_name, &self.git_user_email),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cherry_pick_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("cherry-pick bot failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let client = OctocrabClient::from_token(cli.github_token.clone())
        .context("failed to build GitHub client")?;
    let reporter = StatusReporter::new(
        client.clone(),
        cli.repo.clone(),
        cli.issue_number.map(PrNumber),
    );

    reporter.acknowledge(cli.comment_id.map(CommentId)).await;

    let request = cli.request();
    if let Err(e) = validate_request(&request) {
        reporter.post_usage_error(&e.to_string()).await;
        return Err(e).context("invalid cherry-pick request");
    }

    let worktree_dir = cli
        .worktree_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("cherry-pick-bot-worktrees"));
    let workspaces = WorktreePool::prepare(&cli.repo_dir, &worktree_dir)
        .await
        .with_context(|| format!("failed to prepare worktrees in {}", worktree_dir.display()))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining cherry-picks");
            on_signal.cancel();
        }
    });

    info!(
        pr = %request.pr,
        repo = %request.repo,
        branches = ?request.branches,
        "Processing cherry-pick request"
    );

    let service = CherryPickService::new(client, workspaces);
    let outcomes = service
        .process_request(Arc::new(request), cancel)
        .await
        .context("invalid cherry-pick request")?;

    for outcome in &outcomes {
        println!("{}", serde_json::to_string(&outcome.summary())?);
    }

    reporter.post_outcomes(&outcomes).await;

    if requires_failure_exit(&outcomes) {
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| !o.success())
            .map(|o| o.branch.as_str())
            .collect();
        error!(branches = ?failed, "Cherry-pick failed for some branches");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

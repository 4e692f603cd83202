//! Cherry-pick bot - A GitHub bot that replays merged PRs onto other branches.
//!
//! Given a merged PR and a list of target branches, the bot replays the PR's
//! merge commit onto each target in its own git worktree, pushes a
//! `cherry-pick-<pr>-to-<target>` branch and opens a follow-up PR for it,
//! reusing any follow-up that already exists. Results are posted back to the
//! triggering conversation.

pub mod cherry_pick;
pub mod commands;
pub mod effects;
pub mod git;
pub mod github;
pub mod preflight;
pub mod status;
pub mod types;

#[cfg(test)]
mod test_utils;

//! GitHub API client and port implementations.
//!
//! This module provides the octocrab-backed implementations of the
//! `RemoteRepository` and `CommentSink` traits defined in the effects module.
//!
//! Key features:
//! - One attempt per call; errors are categorized transient vs permanent
//! - Explicit tri-state merge status from GitHub's `merged` flag
//! - Follow-up lookup keyed on exact `owner:head` and base branch

mod client;
mod error;
mod remote;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};

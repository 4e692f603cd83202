//! Core domain types for the cherry-pick bot.
//!
//! Identifiers are newtypes so that a comment id can never be passed where a
//! PR number is expected.

pub mod ids;
pub mod request;

pub use ids::{CommentId, InvalidRepoId, InvalidSha, PrNumber, RepoId, Sha};
pub use request::{CherryPickRequest, CommitIdentity};

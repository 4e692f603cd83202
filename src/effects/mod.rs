//! Effects-as-data for GitHub and git, plus the port traits that execute them.
//!
//! The branch pipeline describes every git command as a [`GitEffect`] value and
//! every GitHub interaction as a call on [`RemoteRepository`]. This keeps the
//! state machine testable with mock interpreters and lets the logging sink
//! report exactly which operation was attempted.

pub mod git;
pub mod github;
pub mod interpreter;

pub use git::GitEffect;
pub use github::{FollowUpPr, MergeInfo, MergeStatus, NewFollowUp, Reaction};
pub use interpreter::{CommentSink, GitInterpreter, GitWorkspaces, RemoteRepository};

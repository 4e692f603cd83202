//! Reporting cherry-pick results back to GitHub.
//!
//! Results are posted as comments on the issue or PR where the command was
//! given, one comment per target branch:
//!
//! ```text
//! ✅ **Cherry-pick to `release-1.0` successful!**
//!
//! A new pull request has been created to cherry-pick this change to `release-1.0`.
//!
//! **PR**: https://github.com/owner/repo/pull/101
//! ```

pub mod format;
pub mod reporter;

pub use format::{GITHUB_COMMENT_SIZE_LIMIT, format_outcome, format_usage_error};
pub use reporter::StatusReporter;

//! Comment bodies for cherry-pick results.
//!
//! Each outcome is rendered as exactly one of three shapes: already exists,
//! successful, or failed. Failure comments quote the error text in a code block
//! followed by fixed remediation notes.

use crate::cherry_pick::{Outcome, OutcomeKind};

/// GitHub's comment size limit (65536 characters).
pub const GITHUB_COMMENT_SIZE_LIMIT: usize = 65536;

/// Maximum size for the quoted error text (git output can be long).
const MAX_ERROR_TEXT_LEN: usize = 16 * 1024;

/// Formats the comment for one outcome.
pub fn format_outcome(outcome: &Outcome) -> String {
    let branch = &outcome.branch;
    match &outcome.result {
        OutcomeKind::AlreadyExists(pr) => format!(
            "ℹ️ **Cherry-pick to `{branch}` already exists!**\n\n\
             A pull request for this cherry-pick already exists: {number}\n\n\
             **PR**: {url}\n",
            number = pr.number,
            url = pr.url,
        ),
        OutcomeKind::Created(pr) => format!(
            "✅ **Cherry-pick to `{branch}` successful!**\n\n\
             A new pull request has been created to cherry-pick this change to `{branch}`.\n\n\
             **PR**: {url}\n\n\
             Please review and merge the cherry-pick PR.\n",
            url = pr.url,
        ),
        OutcomeKind::Failed(error) => {
            let mut body = format!(
                "❌ **Cherry-pick to `{branch}` failed!**\n\n\
                 The automatic cherry-pick to `{branch}` failed.\n\n\
                 **Error:**\n\
                 ```\n{error}\n```\n\n\
                 **Next steps:**\n\
                 - If the PR is not merged, merge it first and try again\n\
                 - If there are conflicts, you'll need to manually cherry-pick this PR\n",
                error = truncate_with_suffix(&error.to_string(), MAX_ERROR_TEXT_LEN),
            );
            if error.is_retriable() {
                body.push_str(RERUN_HINT);
            }
            body
        }
    }
}

/// Appended to failures that a later re-run may fix (rate limits, outages, cancellation).
const RERUN_HINT: &str =
    "- This failure looks temporary; re-running the same `/cherry-pick` command later may succeed\n";

/// Formats the reply to a request that failed validation.
pub fn format_usage_error(message: &str) -> String {
    format!(
        "❌ **Cherry-pick failed**: {message}\n\n\
         **Usage**: `/cherry-pick <target-branch> [<target-branch2> ...]`\n\
         **Examples**:\n\
         - `/cherry-pick release-v1.0`\n\
         - `/cherry-pick release-v1.0 release-v1.1 release-v2.0`\n"
    )
}

/// Truncates a string to the given length with a "... [truncated]" suffix.
fn truncate_with_suffix(s: &str, max_len: usize) -> String {
    const SUFFIX: &str = "... [truncated]";

    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len.saturating_sub(SUFFIX.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &s[..end], SUFFIX)
}

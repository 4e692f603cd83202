//! Command types for `/cherry-pick` comment commands.

use serde::{Deserialize, Serialize};

/// A parsed `/cherry-pick <branch> [<branch> ...]` command from a comment.
///
/// `branches` may be empty when the command was given without arguments; the
/// preflight check turns that into a usage reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickCommand {
    /// Target branches in the order they were written, without duplicates.
    pub branches: Vec<String>,
}

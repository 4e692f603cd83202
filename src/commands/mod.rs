//! Comment command parsing.
//!
//! Users trigger the bot by commenting on a merged PR:
//!
//! - `/cherry-pick <branch>` - Cherry-picks the PR onto `<branch>`
//! - `/cherry-pick <b1> <b2> ...` - Cherry-picks onto several branches at once
//!
//! # Example
//!
//! ```
//! use cherry_pick_bot::commands::{parse_cherry_pick_command, CherryPickCommand};
//!
//! let comment = "Needed on both release lines.\n\n/cherry-pick release-1.0 release-1.1";
//! assert_eq!(
//!     parse_cherry_pick_command(comment),
//!     Some(CherryPickCommand {
//!         branches: vec!["release-1.0".to_string(), "release-1.1".to_string()],
//!     })
//! );
//! ```

mod parser;
mod types;

pub use parser::parse_cherry_pick_command;
pub use types::CherryPickCommand;

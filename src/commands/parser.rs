//! Parser for `/cherry-pick` commands in comment text.
//!
//! A pure function over the comment body; no GitHub access.

use super::types::CherryPickCommand;

/// The slash command that triggers the bot.
const TRIGGER: &str = "/cherry-pick";

/// Parses the first `/cherry-pick` command found in comment text.
///
/// # Parsing Rules
///
/// - The trigger must start a line (leading spaces and tabs are allowed)
/// - The trigger is case-insensitive
/// - The trigger must be followed by whitespace or the end of the line, so
///   `/cherry-picker` is not a command
/// - Branch names are the whitespace-separated words after the trigger on the
///   same line; repeats are dropped, keeping the first occurrence
/// - If multiple command lines are present, the first one wins
/// - A bare `/cherry-pick` yields a command with no branches
///
/// # Examples
///
/// ```
/// use cherry_pick_bot::commands::parse_cherry_pick_command;
///
/// let cmd = parse_cherry_pick_command("/cherry-pick release-1.0 release-2.0").unwrap();
/// assert_eq!(cmd.branches, vec!["release-1.0", "release-2.0"]);
///
/// let cmd = parse_cherry_pick_command("LGTM\n/Cherry-Pick stable").unwrap();
/// assert_eq!(cmd.branches, vec!["stable"]);
///
/// assert_eq!(parse_cherry_pick_command("please /cherry-pick stable"), None);
/// assert_eq!(parse_cherry_pick_command("no command here"), None);
/// ```
pub fn parse_cherry_pick_command(text: &str) -> Option<CherryPickCommand> {
    text.lines().find_map(parse_line)
}

/// Parses a single line, returning a command if the line starts with the trigger.
fn parse_line(line: &str) -> Option<CherryPickCommand> {
    let line = line.trim_start_matches([' ', '\t']);

    // `get` returns None when the slice would split a multi-byte character.
    let candidate = line.get(..TRIGGER.len())?;
    if !candidate.eq_ignore_ascii_case(TRIGGER) {
        return None;
    }

    let rest = &line[TRIGGER.len()..];
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    let mut branches: Vec<String> = Vec::new();
    for word in rest.split_whitespace() {
        if !branches.iter().any(|b| b == word) {
            branches.push(word.to_string());
        }
    }

    Some(CherryPickCommand { branches })
}

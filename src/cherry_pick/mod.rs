//! Cherry-picking a merged PR onto target branches.
//!
//! [`CherryPickService`] fans a [`CherryPickRequest`](crate::types::CherryPickRequest)
//! out to one worker per target branch. Each worker runs the branch pipeline
//! (merge check, dedup, replay in a worktree, follow-up PR) and folds any error
//! into its [`Outcome`], so one branch's failure never reaches another.

mod error;
mod events;
mod outcome;
mod pipeline;
mod service;


pub use error::{CherryPickError, FailureKind};
pub use events::{EventSink, PipelineEvent, TracingSink};
pub use outcome::{Outcome, OutcomeKind, OutcomeStatus, OutcomeSummary, requires_failure_exit};
pub use service::CherryPickService;

use crate::types::PrNumber;

/// Returns the branch that carries the cherry-pick of `pr` onto `target`.
///
/// Deterministic, and distinct targets give distinct names for the same PR.
pub fn cherry_pick_branch_name(pr: PrNumber, target: &str) -> String {
    format!("cherry-pick-{}-to-{}", pr.0, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{arb_branch_name, arb_pr_number};
    use proptest::prelude::*;

    #[test]
    fn branch_name_format() {
        assert_eq!(
            cherry_pick_branch_name(PrNumber(123), "release-1.0"),
            "cherry-pick-123-to-release-1.0"
        );
        assert_eq!(
            cherry_pick_branch_name(PrNumber(7), "release/2.x"),
            "cherry-pick-7-to-release/2.x"
        );
    }

    proptest! {
        #[test]
        fn branch_name_is_deterministic(pr in arb_pr_number(), target in arb_branch_name()) {
            prop_assert_eq!(
                cherry_pick_branch_name(pr, &target),
                cherry_pick_branch_name(pr, &target)
            );
        }

        #[test]
        fn branch_name_is_injective_in_target(
            pr in arb_pr_number(),
            a in arb_branch_name(),
            b in arb_branch_name()
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                cherry_pick_branch_name(pr, &a),
                cherry_pick_branch_name(pr, &b)
            );
        }
    }
}

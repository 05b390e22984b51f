//! Property tests for classifier precedence.
//!
//! For any mix of PostSync hook outcomes the validation tier must follow
//! error > running > ok > pending.

use layerview_status::{classify_validation, StatusTier};
use layerview_types::{HookPhase, HookResult, SyncPhase};
use proptest::prelude::*;

fn outcome_strategy() -> impl Strategy<Value = Option<HookPhase>> {
    prop_oneof![
        Just(None),
        Just(Some(HookPhase::Succeeded)),
        Just(Some(HookPhase::Failed)),
        Just(Some(HookPhase::Error)),
        Just(Some(HookPhase::Running)),
        Just(Some(HookPhase::Terminating)),
        Just(Some(HookPhase::Unknown)),
    ]
}

fn role_strategy() -> impl Strategy<Value = SyncPhase> {
    prop_oneof![Just(SyncPhase::PreSync), Just(SyncPhase::PostSync), Just(SyncPhase::Sync)]
}

fn hook(role: SyncPhase, outcome: Option<HookPhase>) -> HookResult {
    let mut h = HookResult::hook("Job", "h", role, HookPhase::Unknown);
    h.hook_phase = outcome;
    h
}

proptest! {
    #[test]
    fn failure_with_success_is_never_ok(
        others in prop::collection::vec(outcome_strategy(), 0..8),
        failed in prop_oneof![Just(HookPhase::Failed), Just(HookPhase::Error)],
    ) {
        let mut hooks: Vec<HookResult> = others
            .into_iter()
            .map(|o| hook(SyncPhase::PostSync, o))
            .collect();
        hooks.push(hook(SyncPhase::PostSync, Some(failed)));
        hooks.push(hook(SyncPhase::PostSync, Some(HookPhase::Succeeded)));

        prop_assert_eq!(classify_validation(&hooks).tier, StatusTier::Error);
    }

    #[test]
    fn tier_follows_fixed_precedence(
        entries in prop::collection::vec((role_strategy(), outcome_strategy()), 0..12),
    ) {
        let hooks: Vec<HookResult> = entries.iter().map(|(r, o)| hook(*r, *o)).collect();
        let post: Vec<Option<HookPhase>> = entries
            .iter()
            .filter(|(r, _)| *r == SyncPhase::PostSync)
            .map(|(_, o)| *o)
            .collect();

        let expected = if post.is_empty() {
            StatusTier::Pending
        } else if post.iter().any(|o| matches!(o, Some(HookPhase::Failed | HookPhase::Error))) {
            StatusTier::Error
        } else if post.contains(&Some(HookPhase::Running)) {
            StatusTier::Running
        } else if post.iter().all(|o| *o == Some(HookPhase::Succeeded)) {
            StatusTier::Ok
        } else {
            StatusTier::Pending
        };

        prop_assert_eq!(classify_validation(&hooks).tier, expected);
    }

    #[test]
    fn order_of_hooks_does_not_matter(
        outcomes in prop::collection::vec(outcome_strategy(), 1..8),
    ) {
        let forward: Vec<HookResult> = outcomes.iter().map(|o| hook(SyncPhase::PostSync, *o)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        prop_assert_eq!(classify_validation(&forward), classify_validation(&reversed));
    }
}

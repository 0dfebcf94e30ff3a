//! Integration tests for the vote tally engine.

use mise_core::model::{DayOfWeek, MealSlot};
use mise_core::tally::tally_slot;
use mise_test_utils::{ballot, option, ts, vote};

const DEADLINE: &str = "2030-01-08T18:00:00Z";
const TIMELY: &str = "2030-01-07T12:00:00Z";

fn slot_options(ids: &[&str]) -> Vec<mise_core::model::MealPlanOption> {
    ids.iter()
        .map(|id| option(id, "plan-1", "recipe-1", DayOfWeek::Friday, MealSlot::Dinner))
        .collect()
}

#[test]
fn borda_example_from_two_voters() {
    // V1: A=0, B=1, C=2. V2: A=0, B=2, C=1. Scores: A=4, B=1, C=1.
    let options = slot_options(&["opt-a", "opt-b", "opt-c"]);
    let mut votes = ballot("v1", &["opt-a", "opt-b", "opt-c"], TIMELY);
    votes.extend(ballot("v2", &["opt-a", "opt-c", "opt-b"], TIMELY));

    let tally = tally_slot(&options, &votes, ts(DEADLINE));
    assert_eq!(tally.scores["opt-a"], 4);
    assert_eq!(tally.scores["opt-b"], 1);
    assert_eq!(tally.scores["opt-c"], 1);
    assert_eq!(tally.winner.as_deref(), Some("opt-a"));
}

#[test]
fn winner_is_stable_under_vote_permutations() {
    let options = slot_options(&["opt-a", "opt-b", "opt-c"]);
    let mut votes = ballot("v1", &["opt-b", "opt-a", "opt-c"], TIMELY);
    votes.extend(ballot("v2", &["opt-a", "opt-b", "opt-c"], TIMELY));
    votes.extend(ballot("v3", &["opt-b", "opt-c", "opt-a"], TIMELY));

    let expected = tally_slot(&options, &votes, ts(DEADLINE)).winner;
    assert!(expected.is_some());

    for rotation in 0..votes.len() {
        let mut permuted = votes.clone();
        permuted.rotate_left(rotation);
        assert_eq!(
            tally_slot(&options, &permuted, ts(DEADLINE)).winner,
            expected,
            "rotation {rotation} changed the winner"
        );
    }

    let mut reversed = votes.clone();
    reversed.reverse();
    assert_eq!(tally_slot(&options, &reversed, ts(DEADLINE)).winner, expected);
}

#[test]
fn unanimous_first_choice_wins() {
    let options = slot_options(&["opt-a", "opt-b"]);
    let mut votes = Vec::new();
    for voter in ["v1", "v2", "v3", "v4"] {
        votes.extend(ballot(voter, &["opt-b", "opt-a"], TIMELY));
    }

    let tally = tally_slot(&options, &votes, ts(DEADLINE));
    assert_eq!(tally.winner.as_deref(), Some("opt-b"));
    assert!(!tally.tiebroken);
}

#[test]
fn partial_ballots_are_excluded_entirely() {
    let options = slot_options(&["opt-a", "opt-b", "opt-c"]);
    // v1 only ranks two of three options; v2 is complete and prefers C.
    let mut votes = vec![
        vote("opt-a", "v1", 0, TIMELY),
        vote("opt-b", "v1", 1, TIMELY),
    ];
    votes.extend(ballot("v2", &["opt-c", "opt-a", "opt-b"], TIMELY));

    let tally = tally_slot(&options, &votes, ts(DEADLINE));
    assert_eq!(tally.winner.as_deref(), Some("opt-c"));
    assert_eq!(tally.discarded.len(), 1);
    assert_eq!(tally.discarded[0].voter_id, "v1");
}

#[test]
fn no_eligible_ballots_leaves_slot_unresolved() {
    let options = slot_options(&["opt-a", "opt-b"]);
    // Only vote arrives after the deadline.
    let votes = ballot("v1", &["opt-a", "opt-b"], "2030-01-09T00:00:00Z");

    let tally = tally_slot(&options, &votes, ts(DEADLINE));
    assert_eq!(tally.winner, None);
}

#[test]
fn deterministic_tie_break_prefers_smaller_id() {
    let options = slot_options(&["opt-z", "opt-a"]);
    let mut votes = ballot("v1", &["opt-z", "opt-a"], TIMELY);
    votes.extend(ballot("v2", &["opt-a", "opt-z"], TIMELY));

    let tally = tally_slot(&options, &votes, ts(DEADLINE));
    assert_eq!(tally.winner.as_deref(), Some("opt-a"));
    assert!(tally.tiebroken);
}

//! Ranked-vote tally for one (day, meal-slot) group of options.
//!
//! Borda scoring over complete ballots only: a voter whose timely,
//! non-abstaining ranks do not form a permutation of `{0..k-1}` has their
//! whole ballot for the slot discarded. Tie-breaking is deterministic:
//! lexicographically smallest option id, then earliest creation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{MealPlanOption, MealPlanOptionVote};

/// Why a voter's ballot was discarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BallotError {
    #[error("ballot ranks {ranked} of {expected} options")]
    Incomplete { ranked: usize, expected: usize },

    #[error("ballot ranks option {option_id:?} more than once")]
    DuplicateOption { option_id: String },

    #[error("rank {rank} is outside 0..{expected}")]
    RankOutOfRange { rank: u32, expected: usize },

    #[error("two options share rank {rank}")]
    DuplicateRank { rank: u32 },
}

/// A discarded ballot, reported so callers can log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedBallot {
    pub voter_id: String,
    pub reason: BallotError,
}

/// Outcome of tallying one slot.
#[derive(Debug, Clone)]
pub struct SlotTally {
    /// The winning option id, or `None` when no eligible ballots exist.
    pub winner: Option<String>,
    /// Whether the winner was picked by tie-break rather than score alone.
    pub tiebroken: bool,
    /// Borda score per option id (all options present, zero-filled).
    pub scores: BTreeMap<String, u64>,
    pub discarded: Vec<DiscardedBallot>,
}

/// Tally the slot's votes cast on or before `voting_deadline`.
///
/// Pure and order-insensitive: any permutation of `votes` yields the same
/// winner.
pub fn tally_slot(
    options: &[MealPlanOption],
    votes: &[MealPlanOptionVote],
    voting_deadline: DateTime<Utc>,
) -> SlotTally {
    let k = options.len();
    let mut scores: BTreeMap<String, u64> =
        options.iter().map(|o| (o.id.clone(), 0)).collect();

    // Group timely, non-abstaining votes per voter. Late and abstaining
    // votes drop out here, so the affected ballot fails the completeness
    // check below.
    let mut ballots: BTreeMap<&str, Vec<&MealPlanOptionVote>> = BTreeMap::new();
    for vote in votes {
        if !scores.contains_key(&vote.option_id) {
            continue;
        }
        let ballot = ballots.entry(vote.voter_id.as_str()).or_default();
        if vote.cast_at > voting_deadline || vote.abstain {
            continue;
        }
        ballot.push(vote);
    }

    let mut discarded = Vec::new();
    let mut eligible = 0usize;

    for (voter_id, ballot) in &ballots {
        match validate_ballot(ballot, k) {
            Ok(ranks) => {
                eligible += 1;
                for (option_id, rank) in ranks {
                    if let Some(score) = scores.get_mut(option_id) {
                        *score += (k - 1 - rank as usize) as u64;
                    }
                }
            }
            Err(reason) => discarded.push(DiscardedBallot {
                voter_id: (*voter_id).to_string(),
                reason,
            }),
        }
    }

    if eligible == 0 {
        return SlotTally {
            winner: None,
            tiebroken: false,
            scores,
            discarded,
        };
    }

    // Winner: maximal score; ties go to the lexicographically smallest id,
    // then earliest creation as provided.
    let mut best: Option<&MealPlanOption> = None;
    let mut best_score = 0u64;
    let mut tied_at_best = 0usize;
    for option in options {
        let score = scores.get(&option.id).copied().unwrap_or(0);
        match best {
            None => {
                best = Some(option);
                best_score = score;
                tied_at_best = 1;
            }
            Some(current) => {
                if score > best_score {
                    best = Some(option);
                    best_score = score;
                    tied_at_best = 1;
                } else if score == best_score {
                    tied_at_best += 1;
                    if option.id < current.id
                        || (option.id == current.id && option.created_at < current.created_at)
                    {
                        best = Some(option);
                    }
                }
            }
        }
    }

    SlotTally {
        winner: best.map(|o| o.id.clone()),
        tiebroken: tied_at_best > 1,
        scores,
        discarded,
    }
}

/// Check that a ballot forms a complete ranking: every option ranked exactly
/// once with ranks `{0..k-1}`.
fn validate_ballot<'a>(
    ballot: &[&'a MealPlanOptionVote],
    k: usize,
) -> Result<HashMap<&'a str, u32>, BallotError> {
    if ballot.len() != k {
        return Err(BallotError::Incomplete {
            ranked: ballot.len(),
            expected: k,
        });
    }

    let mut ranks: HashMap<&str, u32> = HashMap::with_capacity(k);
    let mut seen_ranks = vec![false; k];

    for vote in ballot {
        if ranks.insert(vote.option_id.as_str(), vote.rank).is_some() {
            return Err(BallotError::DuplicateOption {
                option_id: vote.option_id.clone(),
            });
        }
        let Some(slot) = seen_ranks.get_mut(vote.rank as usize) else {
            return Err(BallotError::RankOutOfRange {
                rank: vote.rank,
                expected: k,
            });
        };
        if *slot {
            return Err(BallotError::DuplicateRank { rank: vote.rank });
        }
        *slot = true;
    }

    Ok(ranks)
}

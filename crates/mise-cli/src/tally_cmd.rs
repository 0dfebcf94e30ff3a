//! `mise tally`: dry-run the vote tally for one plan in a snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use mise_core::model::{DayOfWeek, MealPlanOption, MealSlot};
use mise_core::store::MealPlanStore;
use mise_core::tally::tally_slot;

use crate::dataset::load_snapshot;

/// Run the tally command. Nothing is committed; this prints what the
/// finalizer would select.
pub async fn run_tally(snapshot: &Path, plan_id: &str) -> Result<()> {
    let store = load_snapshot(snapshot)?;

    let plan = store
        .plan(plan_id)
        .with_context(|| format!("meal plan {plan_id:?} not found in snapshot"))?;

    let options = store.options_for_plan(plan_id).await?;
    if options.is_empty() {
        println!("Plan {plan_id} has no options.");
        return Ok(());
    }
    let option_ids: Vec<String> = options.iter().map(|o| o.id.clone()).collect();
    let votes = store.votes_for_options(&option_ids).await?;

    let mut groups: BTreeMap<(DayOfWeek, MealSlot), Vec<MealPlanOption>> = BTreeMap::new();
    for option in options {
        groups.entry(option.slot_key()).or_default().push(option);
    }

    println!(
        "Plan {} (voting deadline {}):",
        plan.id, plan.voting_deadline
    );
    for ((day, slot), group) in &groups {
        let group_ids: Vec<&str> = group.iter().map(|o| o.id.as_str()).collect();
        let slot_votes: Vec<_> = votes
            .iter()
            .filter(|v| group_ids.contains(&v.option_id.as_str()))
            .cloned()
            .collect();

        let tally = tally_slot(group, &slot_votes, plan.voting_deadline);

        println!("  {day} {slot}:");
        for (option_id, score) in &tally.scores {
            println!("    {option_id}: {score}");
        }
        match &tally.winner {
            Some(winner) if tally.tiebroken => println!("    winner: {winner} (tie-break)"),
            Some(winner) => println!("    winner: {winner}"),
            None => println!("    unresolved: no eligible ballots"),
        }
        if !tally.discarded.is_empty() {
            println!("    discarded ballots: {}", tally.discarded.len());
        }
    }

    Ok(())
}

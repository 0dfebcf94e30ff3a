//! Meal-plan finalizer: resolves voting on plans past their deadline.
//!
//! `run_once` is the idempotent unit an external scheduler invokes on a
//! timer; `run` wraps it in a tokio interval loop with cooperative
//! cancellation. Within a tick, plans are processed sequentially in
//! (voting_deadline, id) order; concurrent `run_once` invocations must be
//! serialized by the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::config::{FinalizerConfig, PrepConfig};
use crate::events::{DataChangeEvent, EventPublisher, publish_change};
use crate::model::{DayOfWeek, MealPlan, MealPlanOption, MealSlot};
use crate::prep::generate::PrepTaskGenerator;
use crate::store::{MealPlanStore, PrepTaskSink, RecipeStore, SlotSelection, StoreError};
use crate::tally::tally_slot;

/// The periodic control loop that finalizes due meal plans.
pub struct Finalizer {
    meal_plans: Arc<dyn MealPlanStore>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    generator: PrepTaskGenerator,
    config: FinalizerConfig,
}

/// How one plan fared within a tick.
enum PlanOutcome {
    Finalized,
    /// At least one slot produced no winner; the plan stays open.
    Unresolved,
}

impl Finalizer {
    pub fn new(
        meal_plans: Arc<dyn MealPlanStore>,
        recipes: Arc<dyn RecipeStore>,
        tasks: Arc<dyn PrepTaskSink>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: FinalizerConfig,
        prep_config: PrepConfig,
    ) -> Self {
        let generator = PrepTaskGenerator::new(
            recipes,
            tasks,
            Arc::clone(&events),
            Arc::clone(&clock),
            prep_config,
        );
        Self {
            meal_plans,
            events,
            clock,
            generator,
            config,
        }
    }

    /// Run the loop until `cancel` fires, calling [`Self::run_once`] every
    /// tick.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("finalizer loop cancelled");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.run_once(&cancel).await {
                        Ok(0) => {}
                        Ok(finalized) => {
                            tracing::info!(finalized, "finalized meal plans");
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "finalizer tick failed; retrying next tick");
                        }
                    }
                }
            }
        }
    }

    /// Finalize every due plan once. Returns the number of plans finalized.
    ///
    /// Idempotent: a finalized plan no longer matches the due query, so a
    /// back-to-back second call does nothing. Cancellation aborts before the
    /// next plan; plans already committed this tick stay committed.
    /// `StoreError::Unavailable` aborts the tick and propagates so the
    /// scheduler retries; an invariant violation abandons only the affected
    /// plan.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<usize> {
        let now = self.clock.now();
        let mut plans = self
            .meal_plans
            .plans_awaiting_finalization(now)
            .await
            .context("fetching due meal plans")?;

        // Stable audit order: deadline ascending, then plan id.
        plans.sort_by(|a, b| {
            a.voting_deadline
                .cmp(&b.voting_deadline)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut finalized = 0usize;
        for plan in &plans {
            if cancel.is_cancelled() {
                tracing::info!(plan_id = %plan.id, "cancelled before processing plan");
                break;
            }

            match self.finalize_plan(plan).await {
                Ok(PlanOutcome::Finalized) => finalized += 1,
                Ok(PlanOutcome::Unresolved) => {}
                Err(StoreError::InvariantViolation(reason)) => {
                    tracing::error!(
                        plan_id = %plan.id,
                        reason = %reason,
                        "refusing to finalize plan; abandoning it this tick"
                    );
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("finalizing meal plan {}", plan.id));
                }
            }
        }

        Ok(finalized)
    }

    /// Tally every (day, slot) group of a plan and commit if all resolved.
    async fn finalize_plan(&self, plan: &MealPlan) -> Result<PlanOutcome, StoreError> {
        let options = self.meal_plans.options_for_plan(&plan.id).await?;
        let option_ids: Vec<String> = options.iter().map(|o| o.id.clone()).collect();
        let votes = self.meal_plans.votes_for_options(&option_ids).await?;

        let mut groups: BTreeMap<(DayOfWeek, MealSlot), Vec<MealPlanOption>> = BTreeMap::new();
        for option in options {
            groups.entry(option.slot_key()).or_default().push(option);
        }

        let mut selections = Vec::with_capacity(groups.len());
        let mut chosen_options = Vec::with_capacity(groups.len());

        for ((day, slot), group) in &groups {
            let group_ids: Vec<&str> = group.iter().map(|o| o.id.as_str()).collect();
            let slot_votes: Vec<_> = votes
                .iter()
                .filter(|v| group_ids.contains(&v.option_id.as_str()))
                .cloned()
                .collect();

            let tally = tally_slot(group, &slot_votes, plan.voting_deadline);

            for ballot in &tally.discarded {
                tracing::warn!(
                    plan_id = %plan.id,
                    day = %day,
                    slot = %slot,
                    voter_id = %ballot.voter_id,
                    reason = %ballot.reason,
                    "ballot discarded"
                );
            }

            match tally.winner {
                Some(winner_id) => {
                    if let Some(winner) = group.iter().find(|o| o.id == winner_id) {
                        let mut chosen = winner.clone();
                        chosen.chosen = true;
                        chosen.tiebroken = tally.tiebroken;
                        chosen_options.push(chosen);
                    }
                    selections.push(SlotSelection {
                        option_id: winner_id,
                        tiebroken: tally.tiebroken,
                    });
                }
                None => {
                    tracing::info!(
                        plan_id = %plan.id,
                        day = %day,
                        slot = %slot,
                        "plan_unresolved: slot has no eligible ballots"
                    );
                    return Ok(PlanOutcome::Unresolved);
                }
            }
        }

        self.meal_plans
            .commit_finalization(&plan.id, &selections)
            .await?;

        tracing::info!(
            plan_id = %plan.id,
            selections = selections.len(),
            "meal plan finalized"
        );

        publish_change(
            self.events.as_ref(),
            &DataChangeEvent::meal_plan_finalized(&plan.id),
        )
        .await;
        for selection in &selections {
            publish_change(
                self.events.as_ref(),
                &DataChangeEvent::option_chosen(&plan.id, &selection.option_id),
            )
            .await;
        }

        // Prep tasks ride on the committed selection; failures here must not
        // unwind the finalization.
        if let Err(err) = self
            .generator
            .generate_for_plan(plan, &chosen_options)
            .await
        {
            tracing::error!(
                plan_id = %plan.id,
                error = %err,
                "prep-task generation failed after finalization"
            );
        }

        Ok(PlanOutcome::Finalized)
    }
}

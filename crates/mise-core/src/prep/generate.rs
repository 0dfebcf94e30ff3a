//! Prep-task generation for finalized plans.
//!
//! Walks the chosen options of a plan, runs inference against each option's
//! recipe, and upserts the resulting tasks. Inference is pure per recipe, so
//! options fan out concurrently.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::clock::Clock;
use crate::config::PrepConfig;
use crate::events::{DataChangeEvent, EventPublisher, publish_change};
use crate::model::{MealPlan, MealPlanOption};
use crate::store::{PrepTaskSink, RecipeStore, StoreError, UpsertOutcome};

/// Generates and persists prep tasks for chosen meal-plan options.
pub struct PrepTaskGenerator {
    recipes: Arc<dyn RecipeStore>,
    tasks: Arc<dyn PrepTaskSink>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: PrepConfig,
}

impl PrepTaskGenerator {
    pub fn new(
        recipes: Arc<dyn RecipeStore>,
        tasks: Arc<dyn PrepTaskSink>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: PrepConfig,
    ) -> Self {
        Self {
            recipes,
            tasks,
            events,
            clock,
            config,
        }
    }

    /// Generate prep tasks for every chosen option of `plan`.
    ///
    /// Returns the number of newly created tasks. A recipe whose graph is
    /// malformed is logged and skipped; store failures abort and propagate.
    /// Re-running is idempotent: existing tasks are refreshed, not
    /// duplicated, and creation events fire only for new rows.
    pub async fn generate_for_plan(
        &self,
        plan: &MealPlan,
        options: &[MealPlanOption],
    ) -> Result<usize, StoreError> {
        let chosen: Vec<&MealPlanOption> = options.iter().filter(|o| o.chosen).collect();

        let created = try_join_all(
            chosen
                .iter()
                .map(|option| self.generate_for_option(plan, option)),
        )
        .await?;

        Ok(created.into_iter().sum())
    }

    async fn generate_for_option(
        &self,
        plan: &MealPlan,
        option: &MealPlanOption,
    ) -> Result<usize, StoreError> {
        let recipe = self.recipes.get_recipe(&option.recipe_id).await?;

        let now = self.clock.now();
        let inferred = match super::infer_prep_tasks(
            &recipe,
            plan.starts_at,
            &option.id,
            now,
            &self.config,
        ) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(
                    recipe_id = %recipe.id,
                    option_id = %option.id,
                    error = %err,
                    "recipe graph rejected; skipping prep tasks for option"
                );
                return Ok(0);
            }
        };

        let mut created = 0usize;
        for task in inferred {
            let option_id = task.meal_plan_option_id.clone();
            let task_id = task.id.clone();
            match self.tasks.upsert_task(task).await? {
                UpsertOutcome::Created => {
                    created += 1;
                    publish_change(
                        self.events.as_ref(),
                        &DataChangeEvent::prep_task_created(option_id, task_id),
                    )
                    .await;
                }
                UpsertOutcome::Updated => {}
            }
        }

        if created > 0 {
            tracing::info!(
                option_id = %option.id,
                recipe_id = %recipe.id,
                created,
                "prep tasks created"
            );
        }

        Ok(created)
    }
}

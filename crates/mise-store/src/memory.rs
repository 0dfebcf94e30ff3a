//! In-memory store implementing all three collaborator traits.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mise_core::model::{
    MealPlan, MealPlanOption, MealPlanOptionVote, MealPlanStatus, PrepTask, PrepTaskKind, Recipe,
};
use mise_core::store::{
    MealPlanStore, PrepTaskSink, RecipeStore, SlotSelection, StoreError, UpsertOutcome,
};

#[derive(Default)]
struct State {
    recipes: HashMap<String, Recipe>,
    plans: HashMap<String, MealPlan>,
    options: HashMap<String, MealPlanOption>,
    votes: Vec<MealPlanOptionVote>,
    tasks: HashMap<(String, String, PrepTaskKind), PrepTask>,
}

/// Shared in-memory store. Cheap to clone the handle via `Arc`; all state
/// sits behind one `RwLock`, and every write is atomic with respect to
/// readers.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    /// When set, every trait call fails with `StoreError::Unavailable`.
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a transient outage: while set, every call returns
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -- seeding -----------------------------------------------------------

    pub fn insert_recipe(&self, recipe: Recipe) {
        self.write().recipes.insert(recipe.id.clone(), recipe);
    }

    pub fn insert_plan(&self, plan: MealPlan) {
        self.write().plans.insert(plan.id.clone(), plan);
    }

    pub fn insert_option(&self, option: MealPlanOption) {
        self.write().options.insert(option.id.clone(), option);
    }

    pub fn insert_vote(&self, vote: MealPlanOptionVote) {
        self.write().votes.push(vote);
    }

    // -- inspection --------------------------------------------------------

    pub fn plan(&self, plan_id: &str) -> Option<MealPlan> {
        self.read().plans.get(plan_id).cloned()
    }

    pub fn option(&self, option_id: &str) -> Option<MealPlanOption> {
        self.read().options.get(option_id).cloned()
    }

    pub fn all_plans(&self) -> Vec<MealPlan> {
        let mut plans: Vec<_> = self.read().plans.values().cloned().collect();
        plans.sort_by(|a, b| a.id.cmp(&b.id));
        plans
    }

    pub fn tasks_for_option(&self, option_id: &str) -> Vec<PrepTask> {
        let mut tasks: Vec<_> = self
            .read()
            .tasks
            .values()
            .filter(|t| t.meal_plan_option_id == option_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.recipe_step_id.cmp(&b.recipe_step_id).then(a.kind.cmp(&b.kind)));
        tasks
    }

    pub fn task_count(&self) -> usize {
        self.read().tasks.len()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, StoreError> {
        self.check_available()?;
        self.read()
            .recipes
            .get(recipe_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "recipe",
                id: recipe_id.to_string(),
            })
    }
}

#[async_trait]
impl MealPlanStore for MemoryStore {
    async fn plans_awaiting_finalization(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MealPlan>, StoreError> {
        self.check_available()?;
        Ok(self
            .read()
            .plans
            .values()
            .filter(|p| p.status == MealPlanStatus::AwaitingVotes && p.voting_deadline <= now)
            .cloned()
            .collect())
    }

    async fn options_for_plan(
        &self,
        plan_id: &str,
    ) -> Result<Vec<MealPlanOption>, StoreError> {
        self.check_available()?;
        let mut options: Vec<_> = self
            .read()
            .options
            .values()
            .filter(|o| o.meal_plan_id == plan_id)
            .cloned()
            .collect();
        options.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(options)
    }

    async fn votes_for_options(
        &self,
        option_ids: &[String],
    ) -> Result<Vec<MealPlanOptionVote>, StoreError> {
        self.check_available()?;
        Ok(self
            .read()
            .votes
            .iter()
            .filter(|v| option_ids.contains(&v.option_id))
            .cloned()
            .collect())
    }

    async fn commit_finalization(
        &self,
        plan_id: &str,
        selections: &[SlotSelection],
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.write();

        let plan = state.plans.get(plan_id).ok_or_else(|| StoreError::NotFound {
            entity: "meal plan",
            id: plan_id.to_string(),
        })?;

        // Optimistic status check: reject unless still awaiting votes.
        if plan.status != MealPlanStatus::AwaitingVotes {
            return Err(StoreError::InvariantViolation(format!(
                "meal plan {plan_id:?} has status {}, expected awaiting_votes",
                plan.status
            )));
        }

        for selection in selections {
            let option = state.options.get(&selection.option_id).ok_or_else(|| {
                StoreError::NotFound {
                    entity: "meal plan option",
                    id: selection.option_id.clone(),
                }
            })?;
            if option.meal_plan_id != plan_id {
                return Err(StoreError::InvariantViolation(format!(
                    "option {:?} does not belong to meal plan {plan_id:?}",
                    selection.option_id
                )));
            }
        }

        for selection in selections {
            if let Some(option) = state.options.get_mut(&selection.option_id) {
                option.chosen = true;
                option.tiebroken = selection.tiebroken;
            }
        }
        if let Some(plan) = state.plans.get_mut(plan_id) {
            plan.status = MealPlanStatus::Finalized;
        }

        Ok(())
    }
}

#[async_trait]
impl PrepTaskSink for MemoryStore {
    async fn upsert_task(&self, task: PrepTask) -> Result<UpsertOutcome, StoreError> {
        self.check_available()?;
        let mut state = self.write();
        let key = task.key();

        match state.tasks.get_mut(&key) {
            Some(existing) => {
                // Keep identity and user-driven status; refresh the window.
                existing.cannot_complete_before = task.cannot_complete_before;
                existing.cannot_complete_after = task.cannot_complete_after;
                existing.creation_explanation = task.creation_explanation;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                state.tasks.insert(key, task);
                Ok(UpsertOutcome::Created)
            }
        }
    }
}

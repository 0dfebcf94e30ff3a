//! Collaborator store traits.
//!
//! The core never owns persistence; it reads recipes and meal plans and
//! writes selections and prep tasks through these object-safe traits. The
//! in-memory reference implementation lives in the `mise-store` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{MealPlan, MealPlanOption, MealPlanOptionVote, PrepTask, Recipe};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient outage. Callers abort the current unit of work and retry
    /// on the next tick.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} {id:?} not found")]
    NotFound { entity: &'static str, id: String },

    /// A state transition the store refuses to perform, e.g. finalizing a
    /// plan that is no longer awaiting votes.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// A winning option for one (day, slot) group of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    pub option_id: String,
    /// Whether the tally needed a tie-break to pick this option.
    pub tiebroken: bool,
}

/// Result of an idempotent prep-task upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the task's key; one was created.
    Created,
    /// A row already existed; its window and explanation were refreshed.
    Updated,
}

/// Read-only access to recipes and their steps, products, and instruments.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, StoreError>;
}

/// Meal plans, their options, and collected votes.
#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Plans in `awaiting_votes` whose voting deadline is at or before `now`.
    async fn plans_awaiting_finalization(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MealPlan>, StoreError>;

    async fn options_for_plan(&self, plan_id: &str)
    -> Result<Vec<MealPlanOption>, StoreError>;

    async fn votes_for_options(
        &self,
        option_ids: &[String],
    ) -> Result<Vec<MealPlanOptionVote>, StoreError>;

    /// Atomically mark the selected options chosen and transition the plan
    /// to `finalized`.
    ///
    /// The write carries an optimistic status check: if the plan is no
    /// longer `awaiting_votes`, the store must reject the commit with
    /// [`StoreError::InvariantViolation`] and leave everything untouched, so
    /// competing finalizer instances produce at most one transition per
    /// plan.
    async fn commit_finalization(
        &self,
        plan_id: &str,
        selections: &[SlotSelection],
    ) -> Result<(), StoreError>;
}

/// Write side for generated prep tasks.
#[async_trait]
pub trait PrepTaskSink: Send + Sync {
    /// Insert or refresh a task, keyed by (option, step, kind).
    ///
    /// An existing row keeps its identity and user-driven status; only the
    /// completion window and explanation are refreshed.
    async fn upsert_task(&self, task: PrepTask) -> Result<UpsertOutcome, StoreError>;
}

// Compile-time assertions: the store traits must be object-safe.
const _: () = {
    fn _assert_object_safe(
        _: &dyn RecipeStore,
        _: &dyn MealPlanStore,
        _: &dyn PrepTaskSink,
    ) {
    }
};

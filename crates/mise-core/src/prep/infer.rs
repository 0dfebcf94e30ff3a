//! Two-pass prep-task inference for one recipe.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::PrepConfig;
use crate::graph::{GraphError, RecipeGraph};
use crate::model::{IngredientRef, PrepTask, PrepTaskKind, PrepTaskStatus, Recipe};

/// Explanation attached to every storage-eligible task.
pub const STORAGE_EXPLANATION: &str = "adequate storage instructions for early step";

/// Infer prep tasks for a recipe cooked at `starts_at` for the given option.
///
/// Two passes:
/// - **Thaw**: steps with catalog ingredients at or below the frozen
///   threshold get a fixed thaw window before the event.
/// - **Storage-eligible**: root steps of the recipe DAG whose every product
///   can be stored get a window derived from the products' storage
///   durations, clamped against `now`.
///
/// Idempotent: two calls with the same inputs yield the same task tuples,
/// modulo task identity. A DAG build failure aborts the whole inference.
pub fn infer_prep_tasks(
    recipe: &Recipe,
    starts_at: DateTime<Utc>,
    option_id: &str,
    now: DateTime<Utc>,
    config: &PrepConfig,
) -> Result<Vec<PrepTask>, GraphError> {
    let graph = RecipeGraph::build(recipe)?;

    let mut tasks = Vec::new();
    thaw_pass(recipe, starts_at, option_id, config, &mut tasks);
    storage_pass(recipe, &graph, starts_at, option_id, now, &mut tasks);

    Ok(tasks)
}

/// Pass A: one thaw task per step with frozen catalog ingredients.
fn thaw_pass(
    recipe: &Recipe,
    starts_at: DateTime<Utc>,
    option_id: &str,
    config: &PrepConfig,
    tasks: &mut Vec<PrepTask>,
) {
    for step in &recipe.steps {
        let frozen: Vec<usize> = step
            .ingredients
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry {
                IngredientRef::Catalog {
                    min_ideal_storage_celsius: Some(celsius),
                    ..
                } if *celsius <= config.frozen_ingredient_threshold_celsius => Some(i),
                _ => None,
            })
            .collect();

        if frozen.is_empty() {
            continue;
        }

        tasks.push(PrepTask {
            id: Uuid::new_v4().to_string(),
            meal_plan_option_id: option_id.to_string(),
            recipe_step_id: step.id.clone(),
            kind: PrepTaskKind::FrozenIngredient,
            cannot_complete_before: starts_at - config.thaw_window_earliest_offset,
            cannot_complete_after: starts_at - config.thaw_window_latest_offset,
            status: PrepTaskStatus::Unfinished,
            creation_explanation: thaw_explanation(&frozen, step.index),
        });
    }
}

/// Pass B: storage-eligible root steps.
fn storage_pass(
    recipe: &Recipe,
    graph: &RecipeGraph,
    starts_at: DateTime<Utc>,
    option_id: &str,
    now: DateTime<Utc>,
    tasks: &mut Vec<PrepTask>,
) {
    for index in graph.roots() {
        // A root whose downstream consumer also feeds from another step is
        // deferred: completing this root alone does not unblock anything.
        let shares_consumer = graph
            .out_neighbors(index)
            .any(|consumer| graph.in_neighbors(consumer).any(|parent| parent != index));
        if shares_consumer {
            tracing::debug!(step = index, "root deferred: consumer has other parents");
            continue;
        }

        let Some(step) = recipe.step_at(index) else {
            tracing::warn!(step = index, recipe = %recipe.id, "graph vertex without a recipe step; skipping");
            continue;
        };
        if step.products.is_empty() {
            tracing::warn!(step = index, recipe = %recipe.id, "step yields no products; skipping");
            continue;
        }
        if !step.products.iter().all(|p| p.is_storable()) {
            continue;
        }

        let durations = step.products.iter().map(|p| p.max_storage_duration_secs);
        let shortest = seconds(durations.clone().min().unwrap_or(0));
        let longest = seconds(durations.max().unwrap_or(0));

        let cannot_complete_before = (starts_at - shortest).max(now);
        let cannot_complete_after = (starts_at - longest).max(starts_at);

        if cannot_complete_before > cannot_complete_after {
            tracing::warn!(
                step = index,
                recipe = %recipe.id,
                %cannot_complete_before,
                %cannot_complete_after,
                "inverted completion window; task not emitted"
            );
            continue;
        }

        tasks.push(PrepTask {
            id: Uuid::new_v4().to_string(),
            meal_plan_option_id: option_id.to_string(),
            recipe_step_id: step.id.clone(),
            kind: PrepTaskKind::StorageEligible,
            cannot_complete_before,
            cannot_complete_after,
            status: PrepTaskStatus::Unfinished,
            creation_explanation: STORAGE_EXPLANATION.to_string(),
        });
    }
}

/// Storage durations are capped so window arithmetic cannot overflow the
/// timestamp range.
fn seconds(secs: u64) -> Duration {
    const MAX_SECS: i64 = 100 * 365 * 24 * 60 * 60;
    Duration::seconds(i64::try_from(secs).unwrap_or(MAX_SECS).min(MAX_SECS))
}

/// `"frozen ingredient(s) (#i, #j) for step #N might need to be thawed ahead
/// of time"`, with 1-based ingredient positions.
fn thaw_explanation(zero_based: &[usize], step_index: u32) -> String {
    let noun = if zero_based.len() == 1 {
        "ingredient"
    } else {
        "ingredients"
    };
    let list = zero_based
        .iter()
        .map(|i| format!("#{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("frozen {noun} ({list}) for step #{step_index} might need to be thawed ahead of time")
}

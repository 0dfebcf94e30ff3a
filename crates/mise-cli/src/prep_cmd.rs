//! `mise prep-tasks`: infer prep tasks for a recipe and a meal event.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use mise_core::clock::{Clock, SystemClock};
use mise_core::config::PrepConfig;
use mise_core::prep::infer_prep_tasks;

use crate::dataset::load_recipe;

/// Run the prep-tasks command.
pub fn run_prep_tasks(
    file: &Path,
    starts_at: &str,
    option_id: Option<&str>,
    now_override: Option<&str>,
    config: &PrepConfig,
) -> Result<()> {
    let recipe = load_recipe(file)?;

    let starts_at: DateTime<Utc> = starts_at
        .parse()
        .with_context(|| format!("invalid --starts-at timestamp {starts_at:?}"))?;
    let now = match now_override {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid --now timestamp {raw:?}"))?,
        None => SystemClock.now(),
    };

    let option_id = option_id
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let tasks = match infer_prep_tasks(&recipe, starts_at, &option_id, now, config) {
        Ok(tasks) => tasks,
        Err(err) => anyhow::bail!("invalid recipe {:?}: {err}", recipe.id),
    };

    if tasks.is_empty() {
        println!("No prep tasks for recipe {} at {starts_at}.", recipe.name);
        return Ok(());
    }

    println!("Prep tasks for recipe {} (event at {starts_at}):", recipe.name);
    for task in &tasks {
        println!(
            "  [{}] step {}: {} .. {}",
            task.kind, task.recipe_step_id, task.cannot_complete_before, task.cannot_complete_after
        );
        println!("      {}", task.creation_explanation);
    }

    Ok(())
}

//! Shared file loading for the CLI commands.

use std::path::Path;

use anyhow::{Context, Result, bail};

use mise_core::model::Recipe;
use mise_store::{MemoryStore, Snapshot};

/// Load a recipe document from a JSON file.
pub fn load_recipe(path: &Path) -> Result<Recipe> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recipe file {}", path.display()))?;
    let recipe: Recipe = serde_json::from_str(&contents)
        .with_context(|| format!("malformed recipe in {}", path.display()))?;

    if recipe.steps.is_empty() {
        bail!("malformed recipe in {}: no steps", path.display());
    }

    Ok(recipe)
}

/// Load a snapshot file into a fresh in-memory store.
pub fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    let snapshot = Snapshot::from_json(&contents)
        .with_context(|| format!("malformed snapshot in {}", path.display()))?;
    Ok(snapshot.into_store())
}

//! JSON dataset snapshots.
//!
//! A snapshot is the file format the CLI loads into a [`MemoryStore`]:
//! recipes, meal plans, options, and votes in one document. Parsing
//! validates referential integrity so a broken dataset fails fast instead of
//! surfacing as missing rows mid-run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mise_core::model::{MealPlan, MealPlanOption, MealPlanOptionVote, Recipe};

use crate::memory::MemoryStore;

/// Errors raised while parsing and validating a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate {entity} id {id:?}")]
    DuplicateId { entity: &'static str, id: String },

    #[error("option {option_id:?} references unknown meal plan {meal_plan_id:?}")]
    UnknownPlan {
        option_id: String,
        meal_plan_id: String,
    },

    #[error("option {option_id:?} references unknown recipe {recipe_id:?}")]
    UnknownRecipe {
        option_id: String,
        recipe_id: String,
    },

    #[error("vote {vote_id:?} references unknown option {option_id:?}")]
    UnknownOption { vote_id: String, option_id: String },
}

/// A full dataset, deserialized from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub meal_plans: Vec<MealPlan>,
    #[serde(default)]
    pub options: Vec<MealPlanOption>,
    #[serde(default)]
    pub votes: Vec<MealPlanOptionVote>,
}

impl Snapshot {
    /// Parse and validate a snapshot document.
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check id uniqueness and referential integrity.
    fn validate(&self) -> Result<(), SnapshotError> {
        let mut recipe_ids = std::collections::HashSet::new();
        for recipe in &self.recipes {
            if !recipe_ids.insert(recipe.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    entity: "recipe",
                    id: recipe.id.clone(),
                });
            }
        }

        let mut plan_ids = std::collections::HashSet::new();
        for plan in &self.meal_plans {
            if !plan_ids.insert(plan.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    entity: "meal plan",
                    id: plan.id.clone(),
                });
            }
        }

        let mut option_ids = std::collections::HashSet::new();
        for option in &self.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    entity: "option",
                    id: option.id.clone(),
                });
            }
            if !plan_ids.contains(option.meal_plan_id.as_str()) {
                return Err(SnapshotError::UnknownPlan {
                    option_id: option.id.clone(),
                    meal_plan_id: option.meal_plan_id.clone(),
                });
            }
            if !recipe_ids.contains(option.recipe_id.as_str()) {
                return Err(SnapshotError::UnknownRecipe {
                    option_id: option.id.clone(),
                    recipe_id: option.recipe_id.clone(),
                });
            }
        }

        for vote in &self.votes {
            if !option_ids.contains(vote.option_id.as_str()) {
                return Err(SnapshotError::UnknownOption {
                    vote_id: vote.id.clone(),
                    option_id: vote.option_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Load the snapshot into a fresh [`MemoryStore`].
    pub fn into_store(self) -> MemoryStore {
        let store = MemoryStore::new();
        for recipe in self.recipes {
            store.insert_recipe(recipe);
        }
        for plan in self.meal_plans {
            store.insert_plan(plan);
        }
        for option in self.options {
            store.insert_option(option);
        }
        for vote in self.votes {
            store.insert_vote(vote);
        }
        store
    }
}

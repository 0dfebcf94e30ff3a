//! Shared test fixtures for the mise workspace.
//!
//! Builders for recipes, meal plans, and ballots, plus a pinnable clock.
//! Everything mints deterministic ids where the tests compare them and
//! random ids where they only need uniqueness.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use mise_core::clock::FixedClock;
use mise_core::model::{
    DayOfWeek, IngredientRef, InstrumentRef, MealPlan, MealPlanOption, MealPlanOptionVote,
    MealPlanStatus, MealSlot, Recipe, RecipeStep, StepProduct,
};

/// Parse an RFC 3339 timestamp. Panics on bad input, as test fixtures should.
pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    rfc3339
        .parse()
        .unwrap_or_else(|e| panic!("bad fixture timestamp {rfc3339:?}: {e}"))
}

/// A [`FixedClock`] pinned to an RFC 3339 instant.
pub fn clock_at(rfc3339: &str) -> FixedClock {
    FixedClock(ts(rfc3339))
}

// ---------------------------------------------------------------------------
// Recipe builders
// ---------------------------------------------------------------------------

/// Builder for a [`RecipeStep`]. `new(index)` derives the step id
/// (`step-<index>`) so assertions can name steps without bookkeeping.
pub struct StepBuilder {
    step: RecipeStep,
}

impl StepBuilder {
    pub fn new(index: u32) -> Self {
        Self {
            step: RecipeStep {
                id: format!("step-{index}"),
                index,
                preparation_id: "prep".into(),
                ingredients: Vec::new(),
                instruments: Vec::new(),
                products: Vec::new(),
            },
        }
    }

    pub fn catalog_ingredient(mut self, ingredient_id: &str, min_celsius: Option<i32>) -> Self {
        self.step.ingredients.push(IngredientRef::Catalog {
            ingredient_id: ingredient_id.to_string(),
            min_ideal_storage_celsius: min_celsius,
        });
        self
    }

    pub fn product_ingredient(mut self, step_product_id: &str) -> Self {
        self.step.ingredients.push(IngredientRef::Product {
            step_product_id: step_product_id.to_string(),
        });
        self
    }

    pub fn catalog_instrument(mut self, instrument_id: &str) -> Self {
        self.step.instruments.push(InstrumentRef::Catalog {
            instrument_id: instrument_id.to_string(),
        });
        self
    }

    pub fn product_instrument(mut self, step_product_id: &str) -> Self {
        self.step.instruments.push(InstrumentRef::Product {
            step_product_id: step_product_id.to_string(),
        });
        self
    }

    pub fn product(mut self, id: &str, max_storage_secs: u64, instructions: &str) -> Self {
        self.step.products.push(StepProduct {
            id: id.to_string(),
            name: id.to_string(),
            max_storage_duration_secs: max_storage_secs,
            storage_instructions: instructions.to_string(),
        });
        self
    }

    pub fn build(self) -> RecipeStep {
        self.step
    }
}

/// Builder for a [`Recipe`].
pub struct RecipeBuilder {
    recipe: Recipe,
}

impl RecipeBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            recipe: Recipe {
                id: id.to_string(),
                name: id.to_string(),
                steps: Vec::new(),
            },
        }
    }

    pub fn step(mut self, step: StepBuilder) -> Self {
        self.recipe.steps.push(step.build());
        self
    }

    pub fn build(self) -> Recipe {
        self.recipe
    }
}

// ---------------------------------------------------------------------------
// Meal-plan fixtures
// ---------------------------------------------------------------------------

/// A plan in `awaiting_votes` with the given event and deadline instants.
pub fn meal_plan(id: &str, starts_at: &str, voting_deadline: &str) -> MealPlan {
    MealPlan {
        id: id.to_string(),
        notes: String::new(),
        starts_at: ts(starts_at),
        voting_deadline: ts(voting_deadline),
        status: MealPlanStatus::AwaitingVotes,
        created_at: ts(voting_deadline) - chrono::Duration::days(7),
    }
}

pub fn option(
    id: &str,
    plan_id: &str,
    recipe_id: &str,
    day: DayOfWeek,
    slot: MealSlot,
) -> MealPlanOption {
    MealPlanOption {
        id: id.to_string(),
        meal_plan_id: plan_id.to_string(),
        recipe_id: recipe_id.to_string(),
        day,
        meal_slot: slot,
        chosen: false,
        tiebroken: false,
        created_at: ts("2030-01-01T00:00:00Z"),
    }
}

/// A timely, non-abstaining ranked vote.
pub fn vote(option_id: &str, voter_id: &str, rank: u32, cast_at: &str) -> MealPlanOptionVote {
    MealPlanOptionVote {
        id: Uuid::new_v4().to_string(),
        option_id: option_id.to_string(),
        voter_id: voter_id.to_string(),
        rank,
        abstain: false,
        cast_at: ts(cast_at),
    }
}

/// Cast a full ballot: `ranking` lists option ids from most to least
/// preferred.
pub fn ballot(voter_id: &str, ranking: &[&str], cast_at: &str) -> Vec<MealPlanOptionVote> {
    ranking
        .iter()
        .enumerate()
        .map(|(rank, option_id)| vote(option_id, voter_id, rank as u32, cast_at))
        .collect()
}

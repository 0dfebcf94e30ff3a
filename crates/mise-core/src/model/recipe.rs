use serde::{Deserialize, Serialize};

/// A recipe: an ordered sequence of steps whose products feed the inputs of
/// later steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    /// Ordered by `index`, strictly increasing and contiguous from 1.
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Find the step whose product set contains the given product id.
    pub fn step_producing(&self, product_id: &str) -> Option<&RecipeStep> {
        self.steps
            .iter()
            .find(|step| step.products.iter().any(|p| p.id == product_id))
    }

    /// Find a step by its recipe-local index.
    pub fn step_at(&self, index: u32) -> Option<&RecipeStep> {
        self.steps.iter().find(|step| step.index == index)
    }
}

/// A single step of a recipe.
///
/// A well-formed step yields at least one product; its inputs are either
/// catalog references or products of earlier steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: String,
    /// Position within the recipe, unique, starting at 1.
    pub index: u32,
    pub preparation_id: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub instruments: Vec<InstrumentRef>,
    pub products: Vec<StepProduct>,
}

/// An ingredient entry within a step: either a catalog ingredient or the
/// product of an earlier step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngredientRef {
    Catalog {
        ingredient_id: String,
        /// Minimum ideal storage temperature, in Celsius.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_ideal_storage_celsius: Option<i32>,
    },
    Product { step_product_id: String },
}

impl IngredientRef {
    /// The referenced step-product id, if this entry consumes one.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            Self::Catalog { .. } => None,
            Self::Product { step_product_id } => Some(step_product_id),
        }
    }
}

/// An instrument entry within a step; same either-or shape as
/// [`IngredientRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstrumentRef {
    Catalog { instrument_id: String },
    Product { step_product_id: String },
}

impl InstrumentRef {
    /// The referenced step-product id, if this entry consumes one.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            Self::Catalog { .. } => None,
            Self::Product { step_product_id } => Some(step_product_id),
        }
    }
}

/// Something a step yields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepProduct {
    pub id: String,
    pub name: String,
    /// How long the product keeps, in seconds. `0` means unspecified.
    #[serde(default)]
    pub max_storage_duration_secs: u64,
    /// Free text. Empty means unspecified.
    #[serde(default)]
    pub storage_instructions: String,
}

impl StepProduct {
    /// A product is storable when both the instructions and the duration are
    /// specified.
    pub fn is_storable(&self) -> bool {
        !self.storage_instructions.is_empty() && self.max_storage_duration_secs > 0
    }
}

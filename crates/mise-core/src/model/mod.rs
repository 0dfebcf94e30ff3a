//! Domain models shared by every component.

mod meal_plan;
mod prep_task;
mod recipe;

pub use meal_plan::{
    DayOfWeek, DayOfWeekParseError, MealPlan, MealPlanOption, MealPlanOptionVote, MealPlanStatus,
    MealPlanStatusParseError, MealSlot, MealSlotParseError,
};
pub use prep_task::{
    PrepTask, PrepTaskKind, PrepTaskKindParseError, PrepTaskStatus, PrepTaskStatusParseError,
};
pub use recipe::{IngredientRef, InstrumentRef, Recipe, RecipeStep, StepProduct};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a meal plan.
///
/// Created in `awaiting_votes`; transitions exactly once to `finalized` when
/// every (day, slot) with options has a selection. `archived` is terminal and
/// set only by an operator. Backward transitions are forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPlanStatus {
    AwaitingVotes,
    Finalized,
    Archived,
}

impl fmt::Display for MealPlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingVotes => "awaiting_votes",
            Self::Finalized => "finalized",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

impl FromStr for MealPlanStatus {
    type Err = MealPlanStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_votes" => Ok(Self::AwaitingVotes),
            "finalized" => Ok(Self::Finalized),
            "archived" => Ok(Self::Archived),
            other => Err(MealPlanStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`MealPlanStatus`] string.
#[derive(Debug, Clone)]
pub struct MealPlanStatusParseError(pub String);

impl fmt::Display for MealPlanStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid meal plan status: {:?}", self.0)
    }
}

impl std::error::Error for MealPlanStatusParseError {}

// ---------------------------------------------------------------------------

/// Day of the week an option targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        };
        f.write_str(s)
    }
}

impl FromStr for DayOfWeek {
    type Err = DayOfWeekParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(Self::Monday),
            "tuesday" => Ok(Self::Tuesday),
            "wednesday" => Ok(Self::Wednesday),
            "thursday" => Ok(Self::Thursday),
            "friday" => Ok(Self::Friday),
            "saturday" => Ok(Self::Saturday),
            "sunday" => Ok(Self::Sunday),
            other => Err(DayOfWeekParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`DayOfWeek`] string.
#[derive(Debug, Clone)]
pub struct DayOfWeekParseError(pub String);

impl fmt::Display for DayOfWeekParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day of week: {:?}", self.0)
    }
}

impl std::error::Error for DayOfWeekParseError {}

// ---------------------------------------------------------------------------

/// Named meal within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    SecondBreakfast,
    Brunch,
    Lunch,
    Supper,
    Dinner,
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Breakfast => "breakfast",
            Self::SecondBreakfast => "second_breakfast",
            Self::Brunch => "brunch",
            Self::Lunch => "lunch",
            Self::Supper => "supper",
            Self::Dinner => "dinner",
        };
        f.write_str(s)
    }
}

impl FromStr for MealSlot {
    type Err = MealSlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "second_breakfast" => Ok(Self::SecondBreakfast),
            "brunch" => Ok(Self::Brunch),
            "lunch" => Ok(Self::Lunch),
            "supper" => Ok(Self::Supper),
            "dinner" => Ok(Self::Dinner),
            other => Err(MealSlotParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`MealSlot`] string.
#[derive(Debug, Clone)]
pub struct MealSlotParseError(pub String);

impl fmt::Display for MealSlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid meal slot: {:?}", self.0)
    }
}

impl std::error::Error for MealSlotParseError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A scheduled meal-plan event with a voting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    #[serde(default)]
    pub notes: String,
    /// The real-world instant the plan targets.
    pub starts_at: DateTime<Utc>,
    pub voting_deadline: DateTime<Utc>,
    pub status: MealPlanStatus,
    pub created_at: DateTime<Utc>,
}

/// One candidate recipe for a specific (day, meal-slot) pair of a plan.
///
/// Within a plan, `chosen` holds for at most one option per (day, slot), and
/// is set only at finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanOption {
    pub id: String,
    pub meal_plan_id: String,
    pub recipe_id: String,
    pub day: DayOfWeek,
    pub meal_slot: MealSlot,
    #[serde(default)]
    pub chosen: bool,
    /// Whether selecting this option required a tie-break.
    #[serde(default)]
    pub tiebroken: bool,
    pub created_at: DateTime<Utc>,
}

impl MealPlanOption {
    /// The (day, slot) pair this option competes in.
    pub fn slot_key(&self) -> (DayOfWeek, MealSlot) {
        (self.day, self.meal_slot)
    }
}

/// A single ranked vote on an option.
///
/// A voter's ranks within one (plan, day, slot) must form a permutation of
/// `{0..k-1}`; lower is more preferred. Votes cast after the plan's voting
/// deadline are ignored by the tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanOptionVote {
    pub id: String,
    pub option_id: String,
    pub voter_id: String,
    pub rank: u32,
    /// An abstaining voter contributes no ranking for the slot.
    #[serde(default)]
    pub abstain: bool,
    pub cast_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

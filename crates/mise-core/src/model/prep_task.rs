use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a prep task was created. Part of the task's unique key, so the
/// inferencer stays idempotent per (option, step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepTaskKind {
    /// One or more frozen catalog ingredients may need thawing.
    FrozenIngredient,
    /// Every output of the step can be stored until the event.
    StorageEligible,
}

impl fmt::Display for PrepTaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FrozenIngredient => "frozen_ingredient",
            Self::StorageEligible => "storage_eligible",
        };
        f.write_str(s)
    }
}

impl FromStr for PrepTaskKind {
    type Err = PrepTaskKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frozen_ingredient" => Ok(Self::FrozenIngredient),
            "storage_eligible" => Ok(Self::StorageEligible),
            other => Err(PrepTaskKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PrepTaskKind`] string.
#[derive(Debug, Clone)]
pub struct PrepTaskKindParseError(pub String);

impl fmt::Display for PrepTaskKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid prep task kind: {:?}", self.0)
    }
}

impl std::error::Error for PrepTaskKindParseError {}

// ---------------------------------------------------------------------------

/// Completion status of a prep task. The core only ever creates
/// `unfinished`; the remaining states are driven by users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepTaskStatus {
    Unfinished,
    Delayed,
    Ignored,
    Canceled,
    Finished,
}

impl fmt::Display for PrepTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unfinished => "unfinished",
            Self::Delayed => "delayed",
            Self::Ignored => "ignored",
            Self::Canceled => "canceled",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

impl FromStr for PrepTaskStatus {
    type Err = PrepTaskStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unfinished" => Ok(Self::Unfinished),
            "delayed" => Ok(Self::Delayed),
            "ignored" => Ok(Self::Ignored),
            "canceled" => Ok(Self::Canceled),
            "finished" => Ok(Self::Finished),
            other => Err(PrepTaskStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PrepTaskStatus`] string.
#[derive(Debug, Clone)]
pub struct PrepTaskStatusParseError(pub String);

impl fmt::Display for PrepTaskStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid prep task status: {:?}", self.0)
    }
}

impl std::error::Error for PrepTaskStatusParseError {}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A derived to-do for executing a recipe step ahead of a meal event.
///
/// Invariants: `cannot_complete_before <= cannot_complete_after`, and
/// `cannot_complete_after` never exceeds the event's `starts_at`. Uniquely
/// keyed by (option, step, kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepTask {
    pub id: String,
    pub meal_plan_option_id: String,
    pub recipe_step_id: String,
    pub kind: PrepTaskKind,
    pub cannot_complete_before: DateTime<Utc>,
    pub cannot_complete_after: DateTime<Utc>,
    pub status: PrepTaskStatus,
    pub creation_explanation: String,
}

impl PrepTask {
    /// The upsert key: (option, step, kind).
    pub fn key(&self) -> (String, String, PrepTaskKind) {
        (
            self.meal_plan_option_id.clone(),
            self.recipe_step_id.clone(),
            self.kind,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Outbound domain-change notifications.
//!
//! The publisher is best-effort and at-least-once: consumers must tolerate
//! duplicate deliveries, unordered delivery, and events referencing entities
//! that have since been archived.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Topic every change event is published on.
pub const DATA_CHANGES_TOPIC: &str = "data_changes";

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataChangeEventType {
    MealPlanFinalized,
    MealPlanOptionChosen,
    PrepTaskCreated,
}

impl fmt::Display for DataChangeEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MealPlanFinalized => "meal_plan_finalized",
            Self::MealPlanOptionChosen => "meal_plan_option_chosen",
            Self::PrepTaskCreated => "prep_task_created",
        };
        f.write_str(s)
    }
}

/// A tagged change record published on [`DATA_CHANGES_TOPIC`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataChangeEvent {
    pub event_type: DataChangeEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan_option_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_task_id: Option<String>,
    /// Empty for system-generated events.
    #[serde(default)]
    pub user_id: String,
}

impl DataChangeEvent {
    pub fn meal_plan_finalized(meal_plan_id: impl Into<String>) -> Self {
        Self {
            event_type: DataChangeEventType::MealPlanFinalized,
            meal_plan_id: Some(meal_plan_id.into()),
            meal_plan_option_id: None,
            prep_task_id: None,
            user_id: String::new(),
        }
    }

    pub fn option_chosen(
        meal_plan_id: impl Into<String>,
        option_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type: DataChangeEventType::MealPlanOptionChosen,
            meal_plan_id: Some(meal_plan_id.into()),
            meal_plan_option_id: Some(option_id.into()),
            prep_task_id: None,
            user_id: String::new(),
        }
    }

    pub fn prep_task_created(
        option_id: impl Into<String>,
        prep_task_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type: DataChangeEventType::PrepTaskCreated,
            meal_plan_id: None,
            meal_plan_option_id: Some(option_id.into()),
            prep_task_id: Some(prep_task_id.into()),
            user_id: String::new(),
        }
    }
}

/// Outbound publisher for domain-change notifications.
///
/// Implementations must be safe for concurrent use; the core treats delivery
/// as best-effort and never fails an already-committed write because a
/// publish failed.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()>;
}

// Compile-time assertion: EventPublisher must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn EventPublisher) {}
};

/// Serialize and publish a change event, logging (not propagating) failures.
pub async fn publish_change(publisher: &dyn EventPublisher, event: &DataChangeEvent) {
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, event_type = %event.event_type, "failed to serialize change event");
            return;
        }
    };

    if let Err(err) = publisher.publish(DATA_CHANGES_TOPIC, payload).await {
        tracing::warn!(
            error = %err,
            event_type = %event.event_type,
            "change event publish failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_serializes_snake_case() {
        let json = serde_json::to_value(DataChangeEventType::MealPlanOptionChosen).unwrap();
        assert_eq!(json, "meal_plan_option_chosen");
    }

    #[test]
    fn system_events_carry_empty_user() {
        let event = DataChangeEvent::meal_plan_finalized("plan-1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "meal_plan_finalized");
        assert_eq!(json["meal_plan_id"], "plan-1");
        assert_eq!(json["user_id"], "");
        assert!(json.get("prep_task_id").is_none());
    }

    #[test]
    fn prep_task_event_names_option_and_task() {
        let event = DataChangeEvent::prep_task_created("opt-1", "task-1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["meal_plan_option_id"], "opt-1");
        assert_eq!(json["prep_task_id"], "task-1");
    }
}

//! Event publisher implementations.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use mise_core::events::EventPublisher;

/// Publisher that records every event in memory, for tests and for the CLI
/// to print what a real broker would have received.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Payloads whose `event_type` field matches.
    pub fn events_of_type(&self, event_type: &str) -> Vec<serde_json::Value> {
        self.published()
            .into_iter()
            .filter(|(_, payload)| payload["event_type"] == event_type)
            .map(|(_, payload)| payload)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((topic.to_string(), payload));
        Ok(())
    }
}

/// Publisher that only logs. Stands in for a broker in local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()> {
        tracing::info!(topic, %payload, "event published");
        Ok(())
    }
}

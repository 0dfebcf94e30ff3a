//! Configuration recognised by the core.

use std::time::Duration;

/// Configuration for the finalizer control loop.
#[derive(Debug, Clone)]
pub struct FinalizerConfig {
    /// How often `run_once` fires when driven by [`crate::finalizer::Finalizer::run`].
    pub tick_interval: Duration,
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
        }
    }
}

/// Configuration for prep-task inference.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    /// Catalog ingredients at or below this storage temperature are treated
    /// as frozen and may need thawing.
    pub frozen_ingredient_threshold_celsius: i32,
    /// How far before the event a thaw task may start.
    pub thaw_window_earliest_offset: chrono::Duration,
    /// How close to the event a thaw task must be done.
    pub thaw_window_latest_offset: chrono::Duration,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            frozen_ingredient_threshold_celsius: 3,
            thaw_window_earliest_offset: chrono::Duration::hours(48),
            thaw_window_latest_offset: chrono::Duration::hours(24),
        }
    }
}

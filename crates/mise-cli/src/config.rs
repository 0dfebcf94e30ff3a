//! Configuration file management for mise.
//!
//! Provides a TOML-based config file at `~/.config/mise/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mise_core::config::{FinalizerConfig, PrepConfig};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub finalizer: FinalizerSection,
    #[serde(default)]
    pub prep: PrepSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinalizerSection {
    /// Seconds between finalizer ticks.
    pub tick_interval_secs: u64,
}

impl Default for FinalizerSection {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrepSection {
    pub frozen_ingredient_threshold_celsius: i32,
    pub thaw_window_earliest_hours: i64,
    pub thaw_window_latest_hours: i64,
}

impl Default for PrepSection {
    fn default() -> Self {
        Self {
            frozen_ingredient_threshold_celsius: 3,
            thaw_window_earliest_hours: 48,
            thaw_window_latest_hours: 24,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mise config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mise` or `~/.config/mise`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mise");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mise")
}

/// Return the path to the mise config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MiseConfig {
    pub finalizer: FinalizerConfig,
    pub prep: PrepConfig,
}

impl MiseConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// - Tick interval: `cli_tick_secs` > `MISE_TICK_INTERVAL_SECS` env >
    ///   `config_file.finalizer.tick_interval_secs` > 60s.
    /// - Prep thresholds and thaw offsets come from the config file or their
    ///   defaults.
    pub fn resolve(cli_tick_secs: Option<u64>) -> Result<Self> {
        let file_config = load_config().unwrap_or_default();

        let tick_secs = if let Some(secs) = cli_tick_secs {
            secs
        } else if let Ok(raw) = std::env::var("MISE_TICK_INTERVAL_SECS") {
            raw.parse::<u64>()
                .context("MISE_TICK_INTERVAL_SECS is not a valid number of seconds")?
        } else {
            file_config.finalizer.tick_interval_secs
        };

        Ok(Self {
            finalizer: FinalizerConfig {
                tick_interval: Duration::from_secs(tick_secs),
            },
            prep: PrepConfig {
                frozen_ingredient_threshold_celsius: file_config
                    .prep
                    .frozen_ingredient_threshold_celsius,
                thaw_window_earliest_offset: chrono::Duration::hours(
                    file_config.prep.thaw_window_earliest_hours,
                ),
                thaw_window_latest_offset: chrono::Duration::hours(
                    file_config.prep.thaw_window_latest_hours,
                ),
            },
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

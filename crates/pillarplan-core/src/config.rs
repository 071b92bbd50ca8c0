//! TOML-based engine configuration.
//!
//! Product constants a deployment may want tuned: debounce window,
//! search granularity, end-of-day horizon, as-needed floor, boost cap,
//! and diagnostics capacity. Stored at
//! `~/.config/pillarplan/config.toml` (override the directory with
//! `PILLARPLAN_CONFIG_DIR`). Every field has a serde default, so partial
//! files and old files keep working.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pillar::ClockTime;

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Debounce window for recomputation, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Forward-scan step for fallback slot search, in minutes.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
    /// Rounding applied to "now" before the fallback scan, in minutes.
    #[serde(default = "default_round_minutes")]
    pub round_minutes: u32,
    /// End-of-day search horizon, `HH:mm`.
    #[serde(default = "default_day_end")]
    pub day_end: String,
    /// Days after which an as-needed pillar surfaces.
    #[serde(default = "default_as_needed_floor_days")]
    pub as_needed_floor_days: f64,
    /// Upper bound applied to each boost weight.
    #[serde(default = "default_weight_cap")]
    pub weight_cap: f64,
    /// Scoring snapshot ring capacity.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Smoothing step for the adaptive feedback term, in [0, 1].
    #[serde(default = "default_feedback_step")]
    pub feedback_step: f64,
    /// Bound of the mutation-event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_step_minutes() -> u32 {
    30
}

fn default_round_minutes() -> u32 {
    15
}

fn default_day_end() -> String {
    "22:00".to_string()
}

fn default_as_needed_floor_days() -> f64 {
    7.0
}

fn default_weight_cap() -> f64 {
    0.5
}

fn default_history_capacity() -> usize {
    100
}

fn default_feedback_step() -> f64 {
    0.5
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            debounce_ms: default_debounce_ms(),
            step_minutes: default_step_minutes(),
            round_minutes: default_round_minutes(),
            day_end: default_day_end(),
            as_needed_floor_days: default_as_needed_floor_days(),
            weight_cap: default_weight_cap(),
            history_capacity: default_history_capacity(),
            feedback_step: default_feedback_step(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl EngineConfig {
    /// Parsed day-end horizon. An unparseable string logs a warning and
    /// falls back to the default 22:00 rather than failing the pass.
    pub fn day_end_time(&self) -> ClockTime {
        match ClockTime::parse(&self.day_end) {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(value = %self.day_end, "unparseable day_end, using 22:00");
                ClockTime::new(22, 0)
            }
        }
    }

    /// Debounce window as a chrono duration.
    pub fn debounce(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.debounce_ms.min(i64::MAX as u64) as i64)
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk; a missing file writes and returns the default.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed, or if the
    /// default cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

/// Returns the config directory, honoring `PILLARPLAN_CONFIG_DIR`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var("PILLARPLAN_CONFIG_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pillarplan"),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}

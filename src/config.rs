//! Global configuration parsing and validation.
//!
//! Backoff parameters and intervention thresholds are configuration
//! surfaces with defaults, not fixed constants. Everything is loaded from
//! a single TOML file and validated once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

/// Retry executor tuning for durable-store operations.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum total attempts per operation (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff multiplier applied per attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Delay ceiling, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Symmetric jitter fraction in `[0.0, 1.0]`; 0.2 means ±20%.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_jitter_factor() -> f64 {
    0.2
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

/// Blocking-policy thresholds for the intervention manager.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct InterventionConfig {
    /// Consecutive retries a session may burn before it is blocked.
    #[serde(default = "default_max_consecutive_retries")]
    pub max_consecutive_retries: u32,
    /// Error-rate ceiling in `[0.0, 1.0]` over the session's recent window.
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,
    /// Action names that always block when attempted.
    #[serde(default)]
    pub blocked_actions: Vec<String>,
    /// Action rows recorded alongside every pause (e.g. `notify`, `halt`).
    #[serde(default = "default_pause_actions")]
    pub pause_actions: Vec<String>,
}

fn default_max_consecutive_retries() -> u32 {
    3
}

fn default_error_rate_threshold() -> f64 {
    0.5
}

fn default_pause_actions() -> Vec<String> {
    vec!["notify".to_owned(), "halt".to_owned()]
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            max_consecutive_retries: default_max_consecutive_retries(),
            error_rate_threshold: default_error_rate_threshold(),
            blocked_actions: Vec::new(),
            pause_actions: default_pause_actions(),
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file.
    pub db_path: PathBuf,
    /// Retry executor tuning.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Intervention thresholds and pause actions.
    #[serde(default)]
    pub intervention: InterventionConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate threshold and backoff bounds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(AppError::Config(
                "retry.max_attempts must be greater than zero".into(),
            ));
        }

        if self.retry.multiplier < 1.0 {
            return Err(AppError::Config(
                "retry.multiplier must be at least 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(AppError::Config(
                "retry.jitter_factor must be within [0.0, 1.0]".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.intervention.error_rate_threshold) {
            return Err(AppError::Config(
                "intervention.error_rate_threshold must be within [0.0, 1.0]".into(),
            ));
        }

        Ok(())
    }
}

//! TOML-based application configuration.
//!
//! Stores:
//! - The program window (start/end dates)
//! - Storage location and the key of the state blob
//! - Status-line revert delay
//! - Warning and guard thresholds
//! - Log level
//!
//! Configuration is stored at `~/.config/phoenix/config.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::dates::{ProgramWindow, PROGRAM_END, PROGRAM_START};
use crate::error::{ConfigError, ValidationError};

/// Default key of the persisted state blob.
pub const STORAGE_KEY: &str = "PHOENIX_V12_STATE_OMEGA";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    #[serde(default = "default_program_start")]
    pub start: NaiveDate,
    #[serde(default = "default_program_end")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_key")]
    pub state_key: String,
    /// Database file name inside the data directory.
    #[serde(default = "default_database")]
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Delay before a transient "saved" status reverts to "ready".
    #[serde(default = "default_revert_ms")]
    pub revert_ms: u64,
}

/// Limits used by the warning evaluator and the sprint guardrail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_journal_thin_days")]
    pub journal_thin_days: usize,
    #[serde(default = "default_journal_stable_days")]
    pub journal_stable_days: usize,
    #[serde(default = "default_income_limit")]
    pub income_limit: f64,
    #[serde(default = "default_finished_target")]
    pub finished_prototypes_target: usize,
    #[serde(default = "default_daily_minutes_guard")]
    pub daily_minutes_guard: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `warn` or `phoenix_core=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/phoenix/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_program_start() -> NaiveDate {
    PROGRAM_START
}
fn default_program_end() -> NaiveDate {
    PROGRAM_END
}
fn default_state_key() -> String {
    STORAGE_KEY.into()
}
fn default_database() -> String {
    "phoenix.db".into()
}
fn default_revert_ms() -> u64 {
    600
}
fn default_journal_thin_days() -> usize {
    30
}
fn default_journal_stable_days() -> usize {
    60
}
fn default_income_limit() -> f64 {
    15000.0
}
fn default_finished_target() -> usize {
    3
}
fn default_daily_minutes_guard() -> u32 {
    180
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            start: default_program_start(),
            end: default_program_end(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_key: default_state_key(),
            database: default_database(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            revert_ms: default_revert_ms(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            journal_thin_days: default_journal_thin_days(),
            journal_stable_days: default_journal_stable_days(),
            income_limit: default_income_limit(),
            finished_prototypes_target: default_finished_target(),
            daily_minutes_guard: default_daily_minutes_guard(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| ConfigError::ParseFailed(format!("{key}: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    ConfigError::ParseFailed(format!(
                                        "cannot parse '{value}' as number"
                                    ))
                                })?
                        } else {
                            return Err(ConfigError::ParseFailed(format!(
                                "cannot parse '{value}' as number"
                            )));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the defaults cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field (including a program window whose start is after its end).
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Config = serde_json::from_value(json)
            .map_err(|e| ConfigError::ParseFailed(format!("{key}: {e}")))?;
        next.window()
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        *self = next;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// The configured program window.
    pub fn window(&self) -> Result<ProgramWindow, ValidationError> {
        ProgramWindow::new(self.program.start, self.program.end)
    }
}

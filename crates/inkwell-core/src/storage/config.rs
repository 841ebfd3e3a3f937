//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Writing mode (normal or zen) and the daily word target
//! - Gauge tuning (start level, growth, grace delay, decay rates, flow)
//! - History retention window for the free tier
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::history::{HistoryPolicy, HISTORY_LIMIT_DAYS};
use crate::settings::{SettingsProvider, WritingMode};
use crate::writing::params::{self, GaugeParams};

/// Writing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingConfig {
    #[serde(default)]
    pub mode: WritingMode,
    #[serde(default = "default_word_target")]
    pub word_target: usize,
}

/// Gauge tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeConfig {
    #[serde(default = "default_start")]
    pub start: f64,
    #[serde(default = "default_per_char")]
    pub per_char: f64,
    #[serde(default = "default_grace_delay_secs")]
    pub grace_delay_secs: f64,
    #[serde(default = "default_decay_per_sec")]
    pub decay_per_sec: f64,
    #[serde(default = "default_flow_decay_per_sec")]
    pub flow_decay_per_sec: f64,
    #[serde(default = "default_flow_threshold_secs")]
    pub flow_threshold_secs: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// History configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Days of history visible on the free tier.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub writing: WritingConfig,
    #[serde(default)]
    pub gauge: GaugeConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

// Default functions
fn default_word_target() -> usize {
    params::WORD_TARGET
}
fn default_start() -> f64 {
    params::GAUGE_START
}
fn default_per_char() -> f64 {
    params::GAUGE_PER_CHAR
}
fn default_grace_delay_secs() -> f64 {
    params::GAUGE_GRACE_DELAY_SECS
}
fn default_decay_per_sec() -> f64 {
    params::GAUGE_DECAY
}
fn default_flow_decay_per_sec() -> f64 {
    params::GAUGE_DECAY_FLOW
}
fn default_flow_threshold_secs() -> f64 {
    params::FLOW_THRESHOLD_SECS
}
fn default_tick_ms() -> u64 {
    params::TICK_PERIOD_MS
}
fn default_retention_days() -> u32 {
    HISTORY_LIMIT_DAYS
}

impl Default for WritingConfig {
    fn default() -> Self {
        Self {
            mode: WritingMode::Normal,
            word_target: default_word_target(),
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            per_char: default_per_char(),
            grace_delay_secs: default_grace_delay_secs(),
            decay_per_sec: default_decay_per_sec(),
            flow_decay_per_sec: default_flow_decay_per_sec(),
            flow_threshold_secs: default_flow_threshold_secs(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
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
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
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
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
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
    /// field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Gauge tuning with the word target folded in.
    pub fn gauge_params(&self) -> GaugeParams {
        GaugeParams {
            word_target: self.writing.word_target,
            start: self.gauge.start,
            per_char: self.gauge.per_char,
            grace_delay_secs: self.gauge.grace_delay_secs,
            decay_per_sec: self.gauge.decay_per_sec,
            flow_decay_per_sec: self.gauge.flow_decay_per_sec,
            flow_threshold_secs: self.gauge.flow_threshold_secs,
            tick_ms: self.gauge.tick_ms,
        }
        .sanitized()
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        HistoryPolicy::new(self.history.retention_days)
    }
}

impl SettingsProvider for Config {
    fn writing_mode(&self) -> WritingMode {
        self.writing.mode
    }
}

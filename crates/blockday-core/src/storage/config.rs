//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Day start time and template
//! - Weekly target hours, from which the daily work target is derived
//! - Carry-over behavior
//! - XP awards
//!
//! Configuration is stored at `~/.config/blockday/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::carry_over::CarryOverPolicy;
use crate::clock::{time_or_default, DEFAULT_START_TIME};
use crate::error::ConfigError;
use crate::progression::XpAction;
use crate::schedule::{template_by_id, BlockTemplate, DEFAULT_TEMPLATE_ID};

/// Day-shape configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// "HH:MM"; malformed values fall back to 08:00
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_weekly_target_hours")]
    pub weekly_target_hours: f64,
    #[serde(default = "default_work_days_per_week")]
    pub work_days_per_week: u32,
}

/// Carry-over configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryOverConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub include_skipped_work: bool,
    #[serde(default = "default_max_blocks")]
    pub max_blocks: u32,
}

/// XP award configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpConfig {
    /// XP per completed work block.
    #[serde(default = "default_block_completed")]
    pub block_completed: u32,
    #[serde(default = "default_true")]
    pub milestones: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/blockday/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub carry_over: CarryOverConfig,
    #[serde(default)]
    pub xp: XpConfig,
}

// Default functions
fn default_start_time() -> String {
    DEFAULT_START_TIME.into()
}
fn default_template() -> String {
    DEFAULT_TEMPLATE_ID.into()
}
fn default_weekly_target_hours() -> f64 {
    40.0
}
fn default_work_days_per_week() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_max_blocks() -> u32 {
    10
}
fn default_block_completed() -> u32 {
    XpAction::BlockCompleted.xp()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            template: default_template(),
            weekly_target_hours: default_weekly_target_hours(),
            work_days_per_week: default_work_days_per_week(),
        }
    }
}

impl Default for CarryOverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_skipped_work: true,
            max_blocks: default_max_blocks(),
        }
    }
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            block_completed: default_block_completed(),
            milestones: true,
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
        if key.is_empty() {
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
                        return Err(unknown());
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

    /// Location of `config.toml` in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is missing.
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

    /// Persist to disk.
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
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: serde_json::Error| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut json = serde_json::to_value(&*self).map_err(invalid)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(invalid)?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    pub fn start_time(&self) -> NaiveTime {
        time_or_default(&self.schedule.start_time)
    }

    pub fn template(&self) -> &'static BlockTemplate {
        template_by_id(&self.schedule.template)
    }

    /// Daily work target in minutes: weekly hours spread over work days.
    ///
    /// Non-finite or non-positive settings fall back to the template's
    /// nominal work minutes.
    pub fn target_work_minutes(&self) -> u32 {
        let weekly = self.schedule.weekly_target_hours;
        let days = self.schedule.work_days_per_week;
        if !weekly.is_finite() || weekly <= 0.0 || days == 0 {
            tracing::debug!(weekly, days, "invalid weekly target, using template total");
            return self.template().composed_work_minutes();
        }
        (weekly * 60.0 / f64::from(days)).round().min(f64::from(24 * 60)) as u32
    }

    pub fn carry_over_policy(&self) -> CarryOverPolicy {
        CarryOverPolicy::new()
            .with_enabled(self.carry_over.enabled)
            .with_include_skipped_work(self.carry_over.include_skipped_work)
            .with_max_blocks(self.carry_over.max_blocks as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.start_time, "08:00");
        assert_eq!(parsed.carry_over.max_blocks, 10);
        assert_eq!(parsed.xp.block_completed, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[schedule]\ntemplate = \"deep-work\"\n").unwrap();
        assert_eq!(cfg.schedule.template, "deep-work");
        assert_eq!(cfg.schedule.weekly_target_hours, 40.0);
        assert!(cfg.carry_over.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("carry_over.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("schedule.start_time").as_deref(), Some("08:00"));
        assert_eq!(cfg.get("schedule.work_days_per_week").as_deref(), Some("5"));
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_values() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "carry_over.enabled", "false").unwrap();
        Config::set_json_value_by_path(&mut json, "xp.block_completed", "25").unwrap();
        Config::set_json_value_by_path(&mut json, "schedule.start_time", "09:30").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "carry_over.enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
        assert_eq!(
            Config::get_json_value_by_path(&json, "xp.block_completed").unwrap(),
            &serde_json::Value::Number(25.into())
        );
        assert_eq!(
            Config::get_json_value_by_path(&json, "schedule.start_time").unwrap(),
            &serde_json::Value::String("09:30".to_string())
        );
    }

    #[test]
    fn set_value_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_value("schedule.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set_value("carry_over.enabled", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set_value("schedule", "x").is_err());
    }

    #[test]
    fn set_value_accepts_fractional_hours() {
        let mut cfg = Config::default();
        cfg.set_value("schedule.weekly_target_hours", "37.5").unwrap();
        assert_eq!(cfg.schedule.weekly_target_hours, 37.5);
        assert_eq!(cfg.target_work_minutes(), 450);
    }

    #[test]
    fn target_minutes_from_weekly_hours() {
        let mut cfg = Config::default();
        assert_eq!(cfg.target_work_minutes(), 480);
        cfg.schedule.work_days_per_week = 4;
        assert_eq!(cfg.target_work_minutes(), 600);
        cfg.schedule.weekly_target_hours = f64::NAN;
        assert_eq!(cfg.target_work_minutes(), 480);
        cfg.schedule.template = "half-day".into();
        cfg.schedule.weekly_target_hours = -3.0;
        assert_eq!(cfg.target_work_minutes(), 240);
    }

    #[test]
    fn malformed_start_time_defaults() {
        let mut cfg = Config::default();
        cfg.schedule.start_time = "nine".into();
        assert_eq!(cfg.start_time(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.schedule.template, "standard");

        let mut changed = cfg.clone();
        changed.set_value("schedule.template", "pomodoro").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().schedule.template, "pomodoro");
    }

    #[test]
    fn unparseable_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schedule = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }
}

//! Configuration for dispatchers and notifiers.
//!
//! Configs are plain structs with sensible defaults. They can also be loaded
//! from JSON so a host application can keep them next to its own settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CastResult, ConfigError};

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Label used in log lines emitted by the dispatcher.
    pub label: String,
    /// Log every individual target invocation at trace level.
    pub trace_targets: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            label: "dispatch".to_string(),
            trace_targets: false,
        }
    }
}

/// Notifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Human readable notifier name, used in logs.
    pub name: String,
    /// Settings for the notifier's dispatcher.
    pub dispatcher: DispatcherConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            name: "notifier".to_string(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl NotifierConfig {
    /// Creates a config with the given name and default dispatcher settings.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dispatcher: DispatcherConfig {
                label: name.clone(),
                ..DispatcherConfig::default()
            },
            name,
        }
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> CastResult<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CastResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json_str(&raw)
    }

    /// Checks field constraints.
    pub fn validate(&self) -> CastResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "name".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

//! Registry configuration
//!
//! Persisted with confy as `countdown/config.toml` in the platform config
//! directory. Every field has a default so older or partial files still load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::serde_defaults::{default_delivery_capacity, default_duration_secs, default_true};

const APP_NAME: &str = "countdown";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Whether `stop` reports `(0, true)` to the stopped countdown's callback.
    /// `false` cancels silently.
    #[serde(default = "default_true")]
    pub stop_invokes_callback: bool,

    /// Ticks that may queue up before tickers wait on the delivery task
    #[serde(default = "default_delivery_capacity")]
    pub delivery_capacity: usize,

    /// Duration used by the CLI when none is given
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: i64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            stop_invokes_callback: default_true(),
            delivery_capacity: default_delivery_capacity(),
            default_duration_secs: default_duration_secs(),
        }
    }
}

impl CountdownConfig {
    /// Load the stored configuration, falling back to defaults.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default countdown configuration");
            Self::default()
        })
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    /// Load from an explicit file instead of the platform config directory.
    /// A missing file is created with defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_invoke_callback_on_stop() {
        let config = CountdownConfig::default();
        assert!(config.stop_invokes_callback);
        assert_eq!(config.delivery_capacity, 64);
        assert_eq!(config.default_duration_secs, 60);
    }

    #[test]
    fn saved_settings_load_back() {
        let path = std::env::temp_dir().join(format!(
            "countdown-config-{}-saved.toml",
            std::process::id()
        ));
        let config = CountdownConfig {
            stop_invokes_callback: false,
            default_duration_secs: 90,
            ..CountdownConfig::default()
        };

        config.save_to(&path).unwrap();
        let loaded = CountdownConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = std::env::temp_dir().join(format!(
            "countdown-config-{}-partial.toml",
            std::process::id()
        ));
        std::fs::write(&path, "stop_invokes_callback = false\n").unwrap();
        let loaded = CountdownConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(!loaded.stop_invokes_callback);
        assert_eq!(loaded.delivery_capacity, 64);
        assert_eq!(loaded.default_duration_secs, 60);
    }
}

//! Application configuration, loaded from an optional JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use engine_scene::TickConfig;

/// Tick numbers at which the scripted driver acts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub play_at: u64,
    pub activate_ship_at: u64,
    /// First tick of the pointer drag across the ship.
    pub drag_start: u64,
    pub drag_ticks: u64,
    /// Pointer movement per drag tick.
    pub drag_step: Vec2,
    pub pause_at: u64,
    pub resume_at: u64,
    pub game_over_at: u64,
    pub title_at: u64,
    /// The driver stops the loop on this tick.
    pub stop_at: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            play_at: 30,
            activate_ship_at: 40,
            drag_start: 50,
            drag_ticks: 30,
            drag_step: Vec2::new(2.0, 1.0),
            pause_at: 120,
            resume_at: 150,
            game_over_at: 240,
            title_at: 270,
            stop_at: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tick: TickConfig,
    /// Seconds between nodes spawned while playing.
    pub spawn_interval: f64,
    pub script: ScriptConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            spawn_interval: 0.5,
            script: ScriptConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or use defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid JSON for this config.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply command line overrides.
    #[must_use]
    pub fn with_overrides(mut self, tick_rate: Option<f64>, max_ticks: Option<u64>) -> Self {
        if let Some(rate) = tick_rate {
            self.tick.tick_rate = rate;
        }
        if let Some(max) = max_ticks {
            self.tick.max_ticks = max;
        }
        self
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick.checked_tick_duration().is_some(),
            "tick_rate must be a positive number large enough for a tick to fit in a duration, got {}",
            self.tick.tick_rate
        );
        ensure!(
            self.spawn_interval > 0.0,
            "spawn_interval must be positive, got {}",
            self.spawn_interval
        );
        ensure!(self.script.stop_at > 0, "script.stop_at must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "tick": { "tick_rate": 120.0 }, "script": { "stop_at": 10, "drag_step": [1.0, 0.0] } }"#,
        )
        .unwrap();
        assert_eq!(config.tick.tick_rate, 120.0);
        assert_eq!(config.tick.max_ticks, 0);
        assert_eq!(config.script.stop_at, 10);
        assert_eq!(config.script.drag_step, Vec2::X);
        assert_eq!(config.script.play_at, 30);
        assert_eq!(config.spawn_interval, 0.5);
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = AppConfig::default().with_overrides(Some(240.0), Some(12));
        assert_eq!(config.tick.tick_rate, 240.0);
        assert_eq!(config.tick.max_ticks, 12);

        let unchanged = AppConfig::default().with_overrides(None, None);
        assert_eq!(unchanged, AppConfig::default());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let config = AppConfig::default().with_overrides(Some(0.0), None);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.spawn_interval = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_tick_rate_is_rejected() {
        let config = AppConfig::default().with_overrides(Some(1e-30), None);
        assert!(config.validate().is_err());

        let slow = AppConfig::default().with_overrides(Some(0.5), None);
        assert!(slow.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
        assert!(AppConfig::load(Some(Path::new("/nonexistent/quickstart.json"))).is_err());
    }
}

//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/revtris/settings.toml (or platform equivalent)

use crate::difficulty::{Difficulty, GameMode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gameplay: GameplaySettings,
    /// AI search and cache tuning
    pub ai: AiSettings,
    /// Queue, speed boost and animation pacing
    pub pacing: PacingSettings,
    /// Preferences owned by the UI layer
    pub preferences: Preferences,
}

/// Gameplay settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub difficulty: Difficulty,
    pub mode: GameMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Move cache entries kept before the cache is flushed
    pub cache_capacity: usize,
    /// Share of the profile's thinking time spent before a fresh search
    pub think_fraction: f64,
    /// Share of the fresh-search delay spent on a cache hit
    pub cache_hit_fraction: f64,
    /// Floor for any thinking delay, in milliseconds
    pub min_think_ms: u64,
    /// Seed for the evaluator's randomness; random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Queue capacity without speed boost
    pub baseline_queue: usize,
    /// Queue capacity while speed boost is active
    pub boosted_queue: usize,
    /// Submissions closer together than this build up the boost
    pub boost_threshold_ms: u64,
    /// Submissions further apart than this drop the boost to baseline
    pub relax_window_ms: u64,
    /// Without input for this long the boost decays quickly
    pub idle_window_ms: u64,
    pub idle_decay: f64,
    /// Per-tick decay while input keeps coming
    pub decay_rate: f64,
    pub max_multiplier: f64,
    /// Multiplier gained per rapid submission
    pub multiplier_step: f64,
    /// Delay per row of the drop animation at 1x
    pub drop_step_ms: u64,
    pub min_drop_step_ms: u64,
    /// Line highlight time before rows are removed
    pub line_clear_ms: u64,
    pub min_line_clear_ms: u64,
}

/// Preferences store consumed by the UI (mute toggle, language)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub muted: bool,
    /// Language key handed to the text lookup service
    pub language: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            cache_capacity: 50,
            think_fraction: 0.3,
            cache_hit_fraction: 0.5,
            min_think_ms: 10,
            seed: None,
        }
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            baseline_queue: 5,
            boosted_queue: 10,
            boost_threshold_ms: 100,
            relax_window_ms: 300,
            idle_window_ms: 500,
            idle_decay: 0.8,
            decay_rate: 0.95,
            max_multiplier: 5.0,
            multiplier_step: 0.3,
            drop_step_ms: 16,
            min_drop_step_ms: 2,
            line_clear_ms: 150,
            min_line_clear_ms: 50,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            muted: false,
            language: "ja".to_string(),
        }
    }
}

impl AiSettings {
    pub fn min_think(&self) -> Duration {
        Duration::from_millis(self.min_think_ms)
    }
}

impl PacingSettings {
    pub fn boost_threshold(&self) -> Duration {
        Duration::from_millis(self.boost_threshold_ms)
    }

    pub fn relax_window(&self) -> Duration {
        Duration::from_millis(self.relax_window_ms)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }

    /// Delay per animated row at the given speed multiplier
    pub fn drop_step(&self, multiplier: f64) -> Duration {
        let ms = (self.drop_step_ms as f64 / multiplier.max(1.0)).max(self.min_drop_step_ms as f64);
        millis_f64(ms)
    }

    /// Highlight time before completed rows are removed
    pub fn line_clear_delay(&self, boosted: bool, multiplier: f64) -> Duration {
        if !boosted {
            return Duration::from_millis(self.line_clear_ms);
        }
        let ms = (self.line_clear_ms as f64 / multiplier.max(1.0)).max(self.min_line_clear_ms as f64);
        millis_f64(ms)
    }
}

fn millis_f64(ms: f64) -> Duration {
    Duration::from_micros((ms * 1000.0).round() as u64)
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "revtris", "revtris").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the default location; defaults when no file exists
    pub fn load() -> Result<Self, String> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`; defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, String> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents)
                .map_err(|e| format!("{}: {}", path.display(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(format!("Failed to read {}: {}", path.display(), e)),
        }
    }

    /// Parse settings from TOML text; unknown difficulty or mode names are errors
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Invalid settings: {}", e))
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), String> {
        let Some(path) = Self::settings_path() else {
            return Err("Could not determine settings path".to_string());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(path, contents).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

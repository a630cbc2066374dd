//! Game configuration.
//!
//! Maze, runner and display settings, loaded from and saved to a TOML file.
//! Every section falls back to its defaults for missing keys.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
use crate::world::WorldParams;

/// Configuration file name.
pub const CONFIG_FILE: &str = "honeymaze.toml";

/// Maze shape and generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub columns: usize,
    /// Extra passages opened after carving, as a fraction of the cell count (0.0 - 1.0)
    pub extra_passage_ratio: f64,
    /// Border thickness as a fraction of the cell width
    pub border_factor: f32,
    /// Maze seed (None = random)
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            columns: 10,
            extra_passage_ratio: 0.1,
            border_factor: 0.05,
            seed: None,
        }
    }
}

/// Players, agents and targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Sprite size relative to the cell size
    pub sprite_scale: f32,
    /// Playable area size divided by this gives the per-tick speed at 60 fps
    pub speed_divisor: f32,
    /// Autonomous agents spawned per maze
    pub agent_count: usize,
    /// Targets spawned per maze
    pub target_count: usize,
    /// Probability an agent refuses to turn back (0.0 - 1.0)
    pub reversal_avoidance: f64,
    /// Fraction of its speed an agent covers per tick while seeking
    pub approach_fraction: f32,
    /// Enable a second local player on WASD
    pub second_player: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sprite_scale: 0.8,
            speed_divisor: 200.0,
            agent_count: 1,
            target_count: 3,
            reversal_avoidance: 0.9,
            approach_fraction: 0.9,
            second_player: false,
        }
    }
}

/// Playable area and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Playable area width in pixels
    pub width: u32,
    /// Playable area height in pixels
    pub height: u32,
    /// Ticks per second
    pub target_fps: u32,
    /// Fit the playable area to the whole terminal
    pub fullscreen: bool,
    /// How long a key counts as held after its last press or repeat
    pub input_hold_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1000,
            target_fps: 60,
            fullscreen: false,
            input_hold_ms: 160,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub maze: MazeConfig,
    pub runners: RunnerConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories if needed.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Checks every value is in its accepted range. Maze and runner values
    /// go through [`WorldParams::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        WorldParams::from(self).validate()?;
        if self.display.width == 0 || self.display.height == 0 {
            return Err(invalid("display.width and display.height must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

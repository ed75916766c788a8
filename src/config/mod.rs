mod plugin;

use std::fmt;
use std::path::{Path, PathBuf};

use bevy::{asset::Asset, prelude::*, reflect::TypePath};
pub use plugin::ConfigPlugin;
use serde::Deserialize;

use crate::locomotion::{CharacterConfig, LocomotionSettings, SettingsError};

/// Asset path of the game config, relative to the assets directory.
pub const CONFIG_ASSET: &str = "config/game.config.toml";

#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
pub struct GameConfig {
  pub window: WindowConfig,
  pub camera: CameraConfig,
  #[serde(default)]
  pub character: CharacterConfig,
  #[serde(default)]
  pub pursuit: PursuitConfig,
  pub arena: ArenaConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowConfig {
  pub width: u32,
  pub height: u32,
  pub title: String,
}

/// Follow camera. Angles are in degrees.
#[derive(Deserialize, Debug, Clone)]
pub struct CameraConfig {
  pub fov: f32,
  pub distance: f32,
  pub focus_height: f32,
  pub sensitivity: f32,
  pub top_clamp: f32,
  pub bottom_clamp: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PursuitConfig {
  pub stop_distance: f32,
  pub run_after_distance: f32,
}

impl Default for PursuitConfig {
  fn default() -> Self {
    Self {
      stop_distance: 1.0,
      run_after_distance: 5.0,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ArenaConfig {
  pub seed: u64,
  /// Half the side length of the square floor.
  pub half_extent: f32,
  pub wall_height: f32,
  pub step_count: usize,
  pub step_height_min: f32,
  pub step_height_max: f32,
  pub npc_count: usize,
  pub npc_spawn_radius: f32,
  /// NPCs chase a wandering marker instead of the player.
  #[serde(default)]
  pub chase_wanderer: bool,
  pub wanderer_speed: f32,
  pub player_spawn: [f32; 3],
}

#[derive(Debug)]
pub enum ConfigError {
  Read { path: PathBuf, source: std::io::Error },
  Parse(toml::de::Error),
  Invalid(SettingsError),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Read { path, source } => {
        write!(f, "cannot read {}: {}", path.display(), source)
      }
      ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
      ConfigError::Invalid(e) => write!(f, "invalid character settings: {}", e),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::Read { source, .. } => Some(source),
      ConfigError::Parse(e) => Some(e),
      ConfigError::Invalid(e) => Some(e),
    }
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(e: toml::de::Error) -> Self {
    ConfigError::Parse(e)
  }
}

impl From<SettingsError> for ConfigError {
  fn from(e: SettingsError) -> Self {
    ConfigError::Invalid(e)
  }
}

pub fn parse_config(text: &str) -> Result<GameConfig, ConfigError> {
  Ok(toml::from_str(text)?)
}

pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_config(&text)
}

/// The active, validated config.
#[derive(Resource, Debug, Clone)]
pub struct ConfigLoaded {
  pub window: WindowConfig,
  pub camera: CameraConfig,
  pub character: CharacterConfig,
  pub settings: LocomotionSettings,
  pub pursuit: PursuitConfig,
  pub arena: ArenaConfig,
}

impl TryFrom<GameConfig> for ConfigLoaded {
  type Error = ConfigError;

  fn try_from(config: GameConfig) -> Result<Self, Self::Error> {
    let settings = LocomotionSettings::validate(&config.character)?;
    if config.pursuit.stop_distance >= config.pursuit.run_after_distance {
      warn!(
        "pursuit.stop_distance ({}) should be below pursuit.run_after_distance ({})",
        config.pursuit.stop_distance, config.pursuit.run_after_distance
      );
    }
    Ok(Self {
      window: config.window,
      camera: config.camera,
      character: config.character,
      settings,
      pursuit: config.pursuit,
      arena: config.arena,
    })
  }
}

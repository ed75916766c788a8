//! Named locomotion options and their validated, derived form.
//!
//! Speeds are authored as absolute top speeds. The engine only ever works with
//! `base_speed` and the ratios derived here, so retuning a top speed never
//! requires touching the speed formula.

use serde::Deserialize;

/// Authoring-side options for one character, as they appear in the config
/// file. Convert with [`LocomotionSettings::validate`] before use.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CharacterConfig {
  pub move_speed: f32,
  pub sprint_speed: f32,
  pub strafe_speed: f32,
  pub strafe_run_speed: f32,
  pub crouch_speed: f32,
  /// Seconds to settle the facing angle.
  pub rotation_smooth_time: f32,
  pub speed_change_rate: f32,
  pub jump_height: f32,
  /// Signed, negative is down.
  pub gravity: f32,
  pub terminal_velocity: f32,
  pub resting_velocity: f32,
  pub jump_timeout: f32,
  pub fall_timeout: f32,
  /// Vertical offset of the ground probe sphere, subtracted from the feet.
  pub grounded_offset: f32,
  pub grounded_radius: f32,
  /// Collision group bits treated as walkable ground.
  pub ground_layers: u32,
  /// Minimum cosine between heading and the contact point.
  pub wall_angle_threshold: f32,
  pub wall_distance_threshold: f32,
  pub capsule_height: f32,
  pub capsule_radius: f32,
  pub capsule_center: f32,
}

impl Default for CharacterConfig {
  fn default() -> Self {
    Self {
      move_speed: 2.0,
      sprint_speed: 5.335,
      strafe_speed: 1.8,
      strafe_run_speed: 4.0,
      crouch_speed: 1.5,
      rotation_smooth_time: 0.12,
      speed_change_rate: 10.0,
      jump_height: 1.2,
      gravity: -15.0,
      terminal_velocity: 53.0,
      resting_velocity: -2.0,
      jump_timeout: 0.5,
      fall_timeout: 0.15,
      grounded_offset: -0.14,
      grounded_radius: 0.28,
      ground_layers: crate::core::layers::GROUND,
      wall_angle_threshold: 0.9,
      wall_distance_threshold: 0.16,
      capsule_height: 1.8,
      capsule_radius: 0.28,
      capsule_center: 0.93,
    }
  }
}

/// Validated settings with the speed ratios precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionSettings {
  pub base_speed: f32,
  pub sprint_multiplier: f32,
  pub strafe_multiplier: f32,
  pub strafe_run_multiplier: f32,
  pub crouch_multiplier: f32,
  pub rotation_smooth_time: f32,
  pub speed_change_rate: f32,
  pub jump_height: f32,
  pub gravity: f32,
  pub terminal_velocity: f32,
  pub resting_velocity: f32,
  pub jump_timeout: f32,
  pub fall_timeout: f32,
  pub grounded_offset: f32,
  pub grounded_radius: f32,
  pub ground_layers: u32,
  pub wall_angle_threshold: f32,
  pub wall_distance_threshold: f32,
  pub capsule: CapsuleDims,
}

/// Height and center offset of the character capsule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleDims {
  pub height: f32,
  pub radius: f32,
  /// Height of the capsule center above the feet.
  pub center: f32,
}

impl CapsuleDims {
  /// Half length of the cylindrical section, as Rapier's `capsule_y` wants it.
  pub fn half_segment(&self) -> f32 {
    (self.height * 0.5 - self.radius).max(0.0)
  }
}

impl LocomotionSettings {
  pub fn validate(config: &CharacterConfig) -> Result<Self, SettingsError> {
    let named = [
      ("move_speed", config.move_speed),
      ("sprint_speed", config.sprint_speed),
      ("strafe_speed", config.strafe_speed),
      ("strafe_run_speed", config.strafe_run_speed),
      ("crouch_speed", config.crouch_speed),
      ("rotation_smooth_time", config.rotation_smooth_time),
      ("speed_change_rate", config.speed_change_rate),
      ("jump_height", config.jump_height),
      ("gravity", config.gravity),
      ("terminal_velocity", config.terminal_velocity),
      ("resting_velocity", config.resting_velocity),
      ("jump_timeout", config.jump_timeout),
      ("fall_timeout", config.fall_timeout),
      ("grounded_offset", config.grounded_offset),
      ("grounded_radius", config.grounded_radius),
      ("wall_angle_threshold", config.wall_angle_threshold),
      ("wall_distance_threshold", config.wall_distance_threshold),
      ("capsule_height", config.capsule_height),
      ("capsule_radius", config.capsule_radius),
      ("capsule_center", config.capsule_center),
    ];
    for (name, value) in named {
      if !value.is_finite() {
        return Err(SettingsError::NotFinite(name));
      }
    }

    // Every multiplier divides by this.
    if config.move_speed <= 0.0 {
      return Err(SettingsError::ZeroBaseSpeed(config.move_speed));
    }
    if config.gravity >= 0.0 {
      return Err(SettingsError::GravityNotDownward(config.gravity));
    }
    if config.ground_layers == 0 {
      return Err(SettingsError::NoGroundLayers);
    }

    let non_negative = [
      ("sprint_speed", config.sprint_speed),
      ("strafe_speed", config.strafe_speed),
      ("strafe_run_speed", config.strafe_run_speed),
      ("crouch_speed", config.crouch_speed),
      ("rotation_smooth_time", config.rotation_smooth_time),
      ("speed_change_rate", config.speed_change_rate),
      ("jump_height", config.jump_height),
      ("terminal_velocity", config.terminal_velocity),
      ("jump_timeout", config.jump_timeout),
      ("fall_timeout", config.fall_timeout),
      ("grounded_radius", config.grounded_radius),
      ("wall_distance_threshold", config.wall_distance_threshold),
    ];
    for (name, value) in non_negative {
      if value < 0.0 {
        return Err(SettingsError::Negative { name, value });
      }
    }

    if config.capsule_radius <= 0.0 || config.capsule_height < config.capsule_radius * 2.0 {
      return Err(SettingsError::DegenerateCapsule {
        height: config.capsule_height,
        radius: config.capsule_radius,
      });
    }

    let base = config.move_speed;
    Ok(Self {
      base_speed: base,
      sprint_multiplier: config.sprint_speed / base,
      strafe_multiplier: config.strafe_speed / base,
      strafe_run_multiplier: config.strafe_run_speed / base,
      crouch_multiplier: config.crouch_speed / base,
      rotation_smooth_time: config.rotation_smooth_time,
      speed_change_rate: config.speed_change_rate,
      jump_height: config.jump_height,
      gravity: config.gravity,
      terminal_velocity: config.terminal_velocity,
      resting_velocity: config.resting_velocity,
      jump_timeout: config.jump_timeout,
      fall_timeout: config.fall_timeout,
      grounded_offset: config.grounded_offset,
      grounded_radius: config.grounded_radius,
      ground_layers: config.ground_layers,
      wall_angle_threshold: config.wall_angle_threshold,
      wall_distance_threshold: config.wall_distance_threshold,
      capsule: CapsuleDims {
        height: config.capsule_height,
        radius: config.capsule_radius,
        center: config.capsule_center,
      },
    })
  }

  /// Initial vertical speed that peaks at `jump_height` under `gravity`.
  pub fn jump_velocity(&self) -> f32 {
    (self.jump_height * -2.0 * self.gravity).sqrt()
  }
}

impl Default for LocomotionSettings {
  fn default() -> Self {
    match Self::validate(&CharacterConfig::default()) {
      Ok(settings) => settings,
      Err(err) => unreachable!("default character config is invalid: {err}"),
    }
  }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
  ZeroBaseSpeed(f32),
  GravityNotDownward(f32),
  NoGroundLayers,
  NotFinite(&'static str),
  Negative { name: &'static str, value: f32 },
  DegenerateCapsule { height: f32, radius: f32 },
}

impl std::fmt::Display for SettingsError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::ZeroBaseSpeed(v) => write!(f, "move_speed must be positive, got {}", v),
      Self::GravityNotDownward(g) => write!(f, "gravity must be negative, got {}", g),
      Self::NoGroundLayers => write!(f, "ground_layers must name at least one layer"),
      Self::NotFinite(name) => write!(f, "{} must be a finite number", name),
      Self::Negative { name, value } => {
        write!(f, "{} must not be negative, got {}", name, value)
      }
      Self::DegenerateCapsule { height, radius } => {
        write!(f, "capsule height {} cannot hold radius {}", height, radius)
      }
    }
  }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn multipliers_are_ratios_of_top_speeds() {
    let settings = LocomotionSettings::default();
    assert_eq!(settings.base_speed, 2.0);
    assert!((settings.sprint_multiplier - 5.335 / 2.0).abs() < 1e-6);
    assert!((settings.strafe_multiplier - 0.9).abs() < 1e-6);
    assert!((settings.strafe_run_multiplier - 2.0).abs() < 1e-6);
    assert!((settings.crouch_multiplier - 0.75).abs() < 1e-6);
  }

  #[test]
  fn zero_move_speed_is_rejected() {
    let config = CharacterConfig {
      move_speed: 0.0,
      ..default_config()
    };
    assert_eq!(
      LocomotionSettings::validate(&config),
      Err(SettingsError::ZeroBaseSpeed(0.0))
    );
  }

  #[test]
  fn upward_gravity_is_rejected() {
    let config = CharacterConfig {
      gravity: 9.81,
      ..default_config()
    };
    assert!(matches!(
      LocomotionSettings::validate(&config),
      Err(SettingsError::GravityNotDownward(_))
    ));
  }

  #[test]
  fn missing_ground_layers_are_rejected() {
    let config = CharacterConfig {
      ground_layers: 0,
      ..default_config()
    };
    assert_eq!(
      LocomotionSettings::validate(&config),
      Err(SettingsError::NoGroundLayers)
    );
  }

  #[test]
  fn nan_is_rejected_by_name() {
    let config = CharacterConfig {
      jump_height: f32::NAN,
      ..default_config()
    };
    assert_eq!(
      LocomotionSettings::validate(&config),
      Err(SettingsError::NotFinite("jump_height"))
    );
  }

  #[test]
  fn jump_velocity_matches_projectile_inverse() {
    let settings = LocomotionSettings::default();
    // sqrt(1.2 * 2 * 15) = 6
    assert!((settings.jump_velocity() - 6.0).abs() < 1e-5);
  }

  fn default_config() -> CharacterConfig {
    CharacterConfig::default()
  }
}

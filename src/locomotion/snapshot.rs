use bevy::prelude::*;

/// Animation parameters published once per tick for whatever drives the
/// skeleton. Read-only outside the locomotion systems.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationSnapshot {
  /// Eased horizontal speed, snapped to zero near idle.
  pub speed: f32,
  pub grounded: bool,
  pub airborne: bool,
  /// Airborne for longer than the fall timeout.
  pub free_fall: bool,
  pub strafing: bool,
  pub crouching: bool,
  /// Signed facing error against the camera while turning in place.
  pub turn_in_place_delta: f32,
  pub motion_speed: f32,
  pub strafe_x: f32,
  pub strafe_y: f32,
}

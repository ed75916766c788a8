use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use bevy_enhanced_input::prelude::*;

use crate::config::ConfigLoaded;
use crate::input::{Look, PlayerInput};

/// Marker component for the game camera
#[derive(Component)]
pub struct GameCamera;

/// Marker component for the entity the camera orbits
#[derive(Component)]
pub struct CameraTarget;

/// Orbit state of the follow camera. Yaw is unbounded, pitch is clamped.
#[derive(Resource, Debug, Clone)]
pub struct CameraRig {
  pub yaw: f32,
  pub pitch: f32,
  pub distance: f32,
  pub focus_height: f32,
  pub sensitivity: f32,
  pub top_clamp: f32,
  pub bottom_clamp: f32,
  pub locked: bool,
}

impl Default for CameraRig {
  fn default() -> Self {
    Self {
      yaw: 0.0,
      pitch: 10f32.to_radians(),
      distance: 4.0,
      focus_height: 1.4,
      sensitivity: 0.003,
      top_clamp: 70f32.to_radians(),
      bottom_clamp: (-30f32).to_radians(),
      locked: false,
    }
  }
}

impl CameraRig {
  /// Applies one look delta. Positive x turns right, positive y looks down.
  pub fn look(&mut self, delta: Vec2) {
    if self.locked || delta.length_squared() < 1e-4 {
      return;
    }
    self.yaw = (self.yaw - delta.x * self.sensitivity).rem_euclid(TAU);
    self.pitch = (self.pitch + delta.y * self.sensitivity)
      .max(self.bottom_clamp)
      .min(self.top_clamp);
  }

  pub fn rotation(&self) -> Quat {
    Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch)
  }
}

/// Camera heading fed to the locomotion tick. `None` without a camera.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ViewHeading(pub Option<f32>);

pub fn setup_camera(mut commands: Commands, config: Res<ConfigLoaded>) {
  let camera = &config.camera;
  commands.insert_resource(CameraRig {
    distance: camera.distance,
    focus_height: camera.focus_height,
    sensitivity: camera.sensitivity,
    top_clamp: camera.top_clamp.to_radians(),
    bottom_clamp: camera.bottom_clamp.to_radians(),
    ..default()
  });

  commands.spawn((
    GameCamera,
    Camera3d::default(),
    Projection::Perspective(PerspectiveProjection {
      fov: camera.fov.to_radians(),
      ..default()
    }),
    Transform::from_xyz(0.0, 3.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
  ));
}

// We never want a mouse cursor while playing.
pub fn lock_cursor(mut cursors: Query<&mut CursorOptions, With<PrimaryWindow>>) {
  if let Ok(mut cursor) = cursors.single_mut() {
    cursor.grab_mode = CursorGrabMode::Locked;
    cursor.visible = false;
  }
}

pub fn rotate_rig(
  mut rig: ResMut<CameraRig>,
  players: Query<&Actions<PlayerInput>, With<CameraTarget>>,
  look_actions: Query<(&Action<Look>, &ActionState)>,
) {
  let mut delta = Vec2::ZERO;
  for actions in &players {
    for action_entity in actions.iter() {
      if let Ok((action, action_state)) = look_actions.get(action_entity) {
        if matches!(action_state, ActionState::Fired | ActionState::Ongoing) {
          delta += **action;
        }
      }
    }
  }
  // Mouse deltas are already per frame, so no time scaling.
  rig.look(delta);
}

/// Places the camera behind the target and publishes its heading.
pub fn camera_follow(
  rig: Res<CameraRig>,
  mut heading: ResMut<ViewHeading>,
  targets: Query<&Transform, (With<CameraTarget>, Without<GameCamera>)>,
  mut cameras: Query<&mut Transform, With<GameCamera>>,
) {
  let Ok(target) = targets.single() else {
    return;
  };
  let Ok(mut camera) = cameras.single_mut() else {
    return;
  };

  let rotation = rig.rotation();
  let focus = target.translation + Vec3::Y * rig.focus_height;
  camera.translation = focus - rotation * Vec3::NEG_Z * rig.distance;
  camera.rotation = rotation;
  heading.0 = Some(rig.yaw);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pitch_is_clamped_and_yaw_wraps() {
    let mut rig = CameraRig::default();
    rig.look(Vec2::new(0.0, 10_000.0));
    assert_eq!(rig.pitch, rig.top_clamp);
    rig.look(Vec2::new(0.0, -100_000.0));
    assert_eq!(rig.pitch, rig.bottom_clamp);

    rig.look(Vec2::new(-10_000.0, 0.0));
    assert!((0.0..TAU).contains(&rig.yaw));
  }

  #[test]
  fn mouse_right_turns_clockwise() {
    let mut rig = CameraRig::default();
    rig.look(Vec2::new(100.0, 0.0));
    let forward = rig.rotation() * Vec3::NEG_Z;
    assert!(forward.x > 0.0);
  }

  #[test]
  fn locked_rig_ignores_look() {
    let mut rig = CameraRig {
      locked: true,
      ..default()
    };
    rig.look(Vec2::new(50.0, 50.0));
    assert_eq!(rig.yaw, 0.0);
  }
}

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{CapsuleShape, Character, CharacterHull, GroundContact, MotionRequest};
use super::engine::LocomotionEngine;
use super::settings::LocomotionSettings;
use super::snapshot::AnimationSnapshot;
use crate::control::WallSense;
use crate::core::layers;
use crate::core::physics::{groups, mover_filter};

/// Everything a character root needs except its brain and binding.
pub fn character_bundle(
  settings: LocomotionSettings,
  camera_relative: bool,
  position: Vec3,
) -> impl Bundle {
  let capsule = settings.capsule;
  let shape = Collider::capsule_y(capsule.half_segment(), capsule.radius);

  (
    Character,
    Transform::from_translation(position),
    Visibility::default(),
    RigidBody::KinematicPositionBased,
    KinematicCharacterController {
      custom_shape: Some((shape, Vec3::Y * capsule.center, Quat::IDENTITY)),
      filter_groups: Some(mover_filter()),
      offset: CharacterLength::Absolute(0.01),
      slide: true,
      autostep: Some(CharacterAutostep {
        max_height: CharacterLength::Absolute(0.25),
        min_width: CharacterLength::Absolute(0.2),
        include_dynamic_bodies: false,
      }),
      snap_to_ground: None,
      ..default()
    },
    LocomotionEngine::new(settings, camera_relative),
    CapsuleShape(capsule),
    GroundContact::default(),
    MotionRequest::default(),
    WallSense::default(),
    AnimationSnapshot::default(),
  )
}

/// Spawns a character root with its hull collider. Feet are at `position`.
pub fn spawn_character(
  commands: &mut Commands,
  settings: LocomotionSettings,
  camera_relative: bool,
  position: Vec3,
) -> Entity {
  let capsule = settings.capsule;
  let entity = commands
    .spawn(character_bundle(settings, camera_relative, position))
    .with_children(|parent| {
      parent.spawn((
        CharacterHull,
        Collider::capsule_y(capsule.half_segment(), capsule.radius),
        groups(layers::CHARACTER),
        Transform::from_translation(Vec3::Y * capsule.center),
      ));
    })
    .id();
  info!("Spawned character {:?} at {:?}", entity, position);
  entity
}

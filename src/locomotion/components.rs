use bevy::prelude::*;

use super::settings::CapsuleDims;

/// Root of a character: kinematic body, capsule mover and engine.
#[derive(Component)]
pub struct Character;

/// Child collider that lets the rest of the world collide with a character.
#[derive(Component)]
pub struct CharacterHull;

/// Result of the last ground probe.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroundContact(pub bool);

/// Displacement the engine asked for this tick.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct MotionRequest(pub Vec3);

/// Current capsule dimensions, mirrored onto the mover and hull on change.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape(pub CapsuleDims);

/// Raised when a jump actually launches, for the animation driver.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpStarted {
  pub entity: Entity,
}

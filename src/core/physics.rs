use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Collision layer bits.
pub mod layers {
  /// Walkable surfaces the ground probe looks for.
  pub const GROUND: u32 = 1 << 0;
  /// Static obstacles: walls, steps, crates bolted to the floor.
  pub const WORLD: u32 = 1 << 1;
  /// Character hulls. Movers ignore these.
  pub const CHARACTER: u32 = 1 << 2;
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
  fn build(&self, app: &mut App) {
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
  }
}

/// Collision groups for a collider that belongs to `membership`.
pub fn groups(membership: u32) -> CollisionGroups {
  CollisionGroups::new(Group::from_bits_truncate(membership), Group::ALL)
}

/// What a character capsule sweeps against.
pub fn mover_filter() -> CollisionGroups {
  CollisionGroups::new(
    Group::from_bits_truncate(layers::CHARACTER),
    Group::from_bits_truncate(layers::GROUND | layers::WORLD),
  )
}

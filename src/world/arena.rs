use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ConfigLoaded;
use crate::core::layers;
use crate::core::physics::groups;

const FLOOR_THICKNESS: f32 = 0.5;
const WALL_THICKNESS: f32 = 0.5;
/// Steps stay out of this radius around the player spawn.
const CLEAR_RADIUS: f32 = 3.0;

pub fn spawn_arena(
  mut commands: Commands,
  config: Res<ConfigLoaded>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  let arena = &config.arena;
  let mut rng = StdRng::seed_from_u64(arena.seed);
  let extent = arena.half_extent;

  commands.spawn((
    DirectionalLight {
      illuminance: 8_000.0,
      shadows_enabled: true,
      ..default()
    },
    Transform::from_xyz(6.0, 12.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
  ));

  // Floor top sits at y = 0. Rapier cuboid uses half-extents.
  commands.spawn((
    Mesh3d(meshes.add(Cuboid::new(extent * 2.0, FLOOR_THICKNESS, extent * 2.0))),
    MeshMaterial3d(materials.add(Color::srgb(0.32, 0.36, 0.30))),
    Transform::from_xyz(0.0, -FLOOR_THICKNESS / 2.0, 0.0),
    RigidBody::Fixed,
    Collider::cuboid(extent, FLOOR_THICKNESS / 2.0, extent),
    groups(layers::GROUND),
  ));

  let wall_material = materials.add(Color::srgb(0.55, 0.52, 0.48));
  let half_height = arena.wall_height / 2.0;
  let span = extent + WALL_THICKNESS;
  for (center, half) in [
    (Vec3::new(0.0, half_height, -span), Vec3::new(span, half_height, WALL_THICKNESS / 2.0)),
    (Vec3::new(0.0, half_height, span), Vec3::new(span, half_height, WALL_THICKNESS / 2.0)),
    (Vec3::new(-span, half_height, 0.0), Vec3::new(WALL_THICKNESS / 2.0, half_height, span)),
    (Vec3::new(span, half_height, 0.0), Vec3::new(WALL_THICKNESS / 2.0, half_height, span)),
  ] {
    commands.spawn((
      Mesh3d(meshes.add(Cuboid::from_size(half * 2.0))),
      MeshMaterial3d(wall_material.clone()),
      Transform::from_translation(center),
      RigidBody::Fixed,
      Collider::cuboid(half.x, half.y, half.z),
      groups(layers::WORLD),
    ));
  }

  let step_material = materials.add(Color::srgb(0.62, 0.45, 0.30));
  let low = arena.step_height_min.min(arena.step_height_max);
  let high = arena.step_height_min.max(arena.step_height_max);
  let mut placed = 0;
  let mut attempts = 0;
  while placed < arena.step_count && attempts < arena.step_count * 20 {
    attempts += 1;
    let size = Vec3::new(
      rng.random_range(1.0..4.0),
      rng.random_range(low..=high),
      rng.random_range(1.0..4.0),
    );
    let reach = extent - size.x.max(size.z);
    if reach <= CLEAR_RADIUS {
      continue;
    }
    let x = rng.random_range(-reach..reach);
    let z = rng.random_range(-reach..reach);
    if Vec2::new(x, z).length() < CLEAR_RADIUS {
      continue;
    }

    // Tops are walkable, sides count as walls.
    commands.spawn((
      Mesh3d(meshes.add(Cuboid::from_size(size))),
      MeshMaterial3d(step_material.clone()),
      Transform::from_xyz(x, size.y / 2.0, z),
      RigidBody::Fixed,
      Collider::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
      groups(layers::GROUND | layers::WORLD),
    ));
    placed += 1;
  }

  info!(
    "Arena ready: {}x{} floor, {} steps (seed {})",
    extent * 2.0,
    extent * 2.0,
    placed,
    arena.seed
  );
}

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ConfigLoaded;
use crate::control::{ControlBinding, ControlIntent, PlayerBrain, PursuitBrain};
use crate::core::CameraTarget;
use crate::input::{PlayerInput, player_input_actions};
use crate::locomotion::{CapsuleDims, CapsuleShape, spawn_character};

#[derive(Component)]
pub struct Player;

#[derive(Component)]
pub struct Npc;

/// Render mesh of a character, a child of its root. The mesh is built for
/// `standing_height`.
#[derive(Component)]
pub struct BodyVisual {
  pub standing_height: f32,
}

/// A marker that strolls between random points for the NPCs to chase.
#[derive(Component)]
pub struct Wanderer {
  pub goal: Vec3,
  pub speed: f32,
  pub reach: f32,
  rng: StdRng,
}

impl Wanderer {
  fn next_goal(&mut self) {
    self.goal = Vec3::new(
      self.rng.random_range(-self.reach..=self.reach),
      0.0,
      self.rng.random_range(-self.reach..=self.reach),
    );
  }
}

pub fn spawn_actors(
  mut commands: Commands,
  config: Res<ConfigLoaded>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  let arena = &config.arena;
  let settings = &config.settings;
  let spawn = Vec3::from_array(arena.player_spawn);

  let player = spawn_character(&mut commands, settings.clone(), true, spawn);
  commands.entity(player).insert((
    Player,
    Name::new("Player"),
    PlayerBrain::default(),
    ControlIntent::default(),
    ControlBinding { source: player },
    CameraTarget,
    PlayerInput,
    player_input_actions(),
  ));
  let player_material = materials.add(Color::srgb(0.25, 0.45, 0.85));
  attach_body(
    &mut commands,
    player,
    settings.capsule,
    &mut meshes,
    player_material,
  );

  let target = if arena.chase_wanderer {
    let reach = (arena.half_extent - 1.0).max(0.0);
    let mut wanderer = Wanderer {
      goal: Vec3::ZERO,
      speed: arena.wanderer_speed,
      reach,
      rng: StdRng::seed_from_u64(arena.seed.wrapping_add(1)),
    };
    wanderer.next_goal();
    commands
      .spawn((
        Name::new("Wanderer"),
        Mesh3d(meshes.add(Sphere::new(0.25))),
        MeshMaterial3d(materials.add(Color::srgb(0.95, 0.8, 0.2))),
        Transform::from_xyz(0.0, 0.0, -reach / 2.0),
        wanderer,
      ))
      .id()
  } else {
    player
  };

  let npc_material = materials.add(Color::srgb(0.8, 0.3, 0.25));
  let limit = (arena.half_extent - 1.0).max(0.0);
  for i in 0..arena.npc_count {
    let angle = TAU * i as f32 / arena.npc_count as f32;
    let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * arena.npc_spawn_radius;
    let position = (spawn + offset).clamp(
      Vec3::new(-limit, spawn.y, -limit),
      Vec3::new(limit, spawn.y, limit),
    );

    let npc = spawn_character(&mut commands, settings.clone(), false, position);
    commands.entity(npc).insert((
      Npc,
      Name::new(format!("Npc {}", i)),
      PursuitBrain::new(
        target,
        npc,
        config.pursuit.stop_distance,
        config.pursuit.run_after_distance,
      ),
      ControlIntent::default(),
      ControlBinding { source: npc },
    ));
    attach_body(
      &mut commands,
      npc,
      settings.capsule,
      &mut meshes,
      npc_material.clone(),
    );
  }

  info!("Spawned player and {} NPCs", arena.npc_count);
}

fn attach_body(
  commands: &mut Commands,
  character: Entity,
  capsule: CapsuleDims,
  meshes: &mut Assets<Mesh>,
  material: Handle<StandardMaterial>,
) {
  let body = commands
    .spawn((
      BodyVisual {
        standing_height: capsule.height,
      },
      Mesh3d(meshes.add(Capsule3d::new(capsule.radius, capsule.half_segment() * 2.0))),
      MeshMaterial3d(material),
      Transform::from_translation(Vec3::Y * capsule.center),
    ))
    .id();
  commands.entity(character).add_child(body);
}

pub fn wander(time: Res<Time>, mut wanderers: Query<(&mut Wanderer, &mut Transform)>) {
  let dt = time.delta_secs();
  for (mut wanderer, mut transform) in &mut wanderers {
    let to_goal = wanderer.goal - transform.translation;
    let step = wanderer.speed * dt;
    if to_goal.length() <= step {
      transform.translation = wanderer.goal;
      wanderer.next_goal();
    } else {
      transform.translation += to_goal.normalize_or_zero() * step;
    }
  }
}

/// Squashes the body mesh along with the capsule while crouching.
pub fn fit_body_visuals(
  characters: Query<(&CapsuleShape, &Children), Changed<CapsuleShape>>,
  mut bodies: Query<(&BodyVisual, &mut Transform)>,
) {
  for (shape, children) in &characters {
    for child in children.iter() {
      if let Ok((body, mut transform)) = bodies.get_mut(child) {
        transform.translation = Vec3::Y * shape.0.center;
        transform.scale.y = shape.0.height / body.standing_height.max(f32::EPSILON);
      }
    }
  }
}

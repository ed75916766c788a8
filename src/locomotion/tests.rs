use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use super::components::*;
use super::engine::LocomotionEngine;
use super::settings::LocomotionSettings;
use super::snapshot::AnimationSnapshot;
use super::systems;
use crate::control::{
  ControlBinding, ControlIntent, ControlSignal, PursuitBrain, SignalKind, WallSense, pursuit,
  sample_control,
};

const TICK: f32 = 1.0 / 60.0;

/// Locomotion systems on flat, always-grounded footing, without Rapier.
fn headless_app() -> App {
  let mut app = App::new();
  app
    .add_plugins(MinimalPlugins)
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
      TICK,
    )))
    .add_message::<ControlSignal>()
    .add_message::<JumpStarted>()
    .add_systems(
      Update,
      (
        pursuit::update_pursuit,
        sample_control::<PursuitBrain>,
        systems::deliver_signals,
        systems::tick_locomotion,
      )
        .chain(),
    );
  app
}

fn spawn_walker(app: &mut App, camera_relative: bool) -> Entity {
  let settings = LocomotionSettings::default();
  let capsule = settings.capsule;
  let entity = app
    .world_mut()
    .spawn((
      Transform::default(),
      LocomotionEngine::new(settings, camera_relative),
      CapsuleShape(capsule),
      GroundContact(true),
      MotionRequest::default(),
      WallSense::default(),
      AnimationSnapshot::default(),
      ControlIntent::default(),
    ))
    .id();
  app
    .world_mut()
    .entity_mut(entity)
    .insert(ControlBinding { source: entity });
  entity
}

fn run(app: &mut App, ticks: usize) {
  for _ in 0..ticks {
    app.update();
  }
}

#[test]
fn pursuer_runs_toward_distant_target() {
  let mut app = headless_app();
  let target = app
    .world_mut()
    .spawn(Transform::from_xyz(0.0, 0.0, -20.0))
    .id();
  let npc = spawn_walker(&mut app, false);
  app
    .world_mut()
    .entity_mut(npc)
    .insert(PursuitBrain::new(target, npc, 1.0, 5.0));

  run(&mut app, 90);

  let engine = app.world().get::<LocomotionEngine>(npc).unwrap();
  assert!(engine.state().sprinting);
  let settings = engine.settings();
  let top = settings.base_speed * settings.sprint_multiplier;
  assert!((engine.state().horizontal_speed - top).abs() < 0.01);

  let request = app.world().get::<MotionRequest>(npc).unwrap().0;
  assert!(request.z < 0.0, "should move towards -Z, got {request:?}");
  assert!(request.x.abs() < 1e-4);

  let snapshot = app.world().get::<AnimationSnapshot>(npc).unwrap();
  assert!(snapshot.speed > 0.0);
  assert!(snapshot.grounded);
}

#[test]
fn unbound_source_reads_as_idle() {
  let mut app = headless_app();
  let walker = spawn_walker(&mut app, true);
  app
    .world_mut()
    .entity_mut(walker)
    .insert(ControlBinding {
      source: Entity::PLACEHOLDER,
    });

  run(&mut app, 30);

  let engine = app.world().get::<LocomotionEngine>(walker).unwrap();
  assert_eq!(engine.state().horizontal_speed, 0.0);
  assert_eq!(app.world().get::<MotionRequest>(walker).unwrap().0.x, 0.0);
}

#[test]
fn jump_signal_launches_after_cooldown() {
  let mut app = headless_app();
  let walker = spawn_walker(&mut app, true);

  // Still inside the landing cooldown.
  run(&mut app, 2);
  app.world_mut().write_message(ControlSignal {
    source: walker,
    kind: SignalKind::Jump,
  });
  app.update();
  assert_eq!(app.world().resource::<Messages<JumpStarted>>().len(), 0);

  run(&mut app, 60);
  app.world_mut().write_message(ControlSignal {
    source: walker,
    kind: SignalKind::Jump,
  });
  app.update();

  let messages = app.world().resource::<Messages<JumpStarted>>();
  let mut cursor = messages.get_cursor();
  let started: Vec<_> = cursor.read(messages).copied().collect();
  assert_eq!(started, vec![JumpStarted { entity: walker }]);

  let engine = app.world().get::<LocomotionEngine>(walker).unwrap();
  assert!(engine.state().vertical_velocity > 0.0);
  assert!(app.world().get::<MotionRequest>(walker).unwrap().0.y > 0.0);
}

#[test]
fn signals_only_reach_bound_engines() {
  let mut app = headless_app();
  let walker = spawn_walker(&mut app, true);
  let other = spawn_walker(&mut app, true);

  app.world_mut().write_message(ControlSignal {
    source: other,
    kind: SignalKind::CrouchToggle,
  });
  app.update();

  let full = LocomotionSettings::default().capsule;
  assert_eq!(app.world().get::<CapsuleShape>(walker).unwrap().0, full);
  let crouched = app.world().get::<CapsuleShape>(other).unwrap().0;
  assert_eq!(crouched.height, full.height / 2.0);
  assert_eq!(crouched.center, full.center / 2.0);
  assert!(app.world().get::<AnimationSnapshot>(other).unwrap().crouching);
}

#[test]
fn strafe_toggle_reaches_snapshot() {
  let mut app = headless_app();
  let walker = spawn_walker(&mut app, true);

  app.world_mut().write_message(ControlSignal {
    source: walker,
    kind: SignalKind::StrafeToggle,
  });
  app.update();

  assert!(app.world().get::<AnimationSnapshot>(walker).unwrap().strafing);
}

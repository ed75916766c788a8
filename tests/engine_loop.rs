//! Drives the locomotion engine against a flat floor at y = 0, without ECS
//! or physics.

use bevy::prelude::*;
use third_person::control::{PursuitCommand, pursue};
use third_person::locomotion::LocomotionSettings;
use third_person::locomotion::engine::{JumpOutcome, LocomotionEngine, TickInput};

const DT: f32 = 1.0 / 60.0;

struct Body {
  engine: LocomotionEngine,
  position: Vec3,
}

impl Body {
  fn new(position: Vec3) -> Self {
    Self {
      engine: LocomotionEngine::new(LocomotionSettings::default(), false),
      position,
    }
  }

  fn step(&mut self, movement: Vec2, sprint: bool) {
    let motion = self.engine.tick(&TickInput {
      dt: DT,
      movement,
      sprint,
      grounded: self.position.y <= 1e-3,
      position: self.position,
      view_yaw: None,
    });
    self.position += motion.translation;
    self.position.y = self.position.y.max(0.0);
  }
}

#[test]
fn jump_arc_peaks_near_jump_height_and_lands() {
  let mut body = Body::new(Vec3::ZERO);
  for _ in 0..60 {
    body.step(Vec2::ZERO, false);
  }

  let attempt = body.engine.jump(&|_: Vec3| -> Option<Vec3> { None });
  assert!(matches!(attempt.outcome, JumpOutcome::Launched { .. }));

  let mut peak = 0.0f32;
  let mut airborne_ticks = 0;
  for _ in 0..120 {
    body.step(Vec2::ZERO, false);
    peak = peak.max(body.position.y);
    if body.position.y > 0.0 {
      airborne_ticks += 1;
    }
  }

  let height = body.engine.settings().jump_height;
  assert!(
    (peak - height).abs() < 0.15,
    "peak {peak} should be close to {height}"
  );
  // Flight time of a 1.2 m jump under 15 m/s^2 is 0.8 s.
  assert!((40..=55).contains(&airborne_ticks), "{airborne_ticks} ticks in the air");
  assert_eq!(body.position.y, 0.0);
  assert!(body.engine.state().grounded);
}

#[test]
fn walking_off_a_ledge_enters_free_fall_only_after_the_timeout() {
  let mut body = Body::new(Vec3::new(0.0, 10.0, 0.0));
  body.step(Vec2::ZERO, false);
  assert!(!body.engine.snapshot().free_fall);

  for _ in 0..20 {
    body.step(Vec2::ZERO, false);
  }
  assert!(body.engine.snapshot().airborne);
  assert!(body.engine.snapshot().free_fall);
}

#[test]
fn pursuer_closes_in_and_stops_near_the_target() {
  let target = Vec3::new(0.0, 0.0, -8.0);
  let mut body = Body::new(Vec3::ZERO);
  let mut sprinted = false;

  for _ in 0..600 {
    let (movement, sprint) = match pursue(body.position, target, 1.0, 5.0) {
      PursuitCommand::Seek { movement, sprint } => (movement, sprint),
      PursuitCommand::Hold => (Vec2::ZERO, false),
    };
    sprinted |= sprint;
    body.step(movement, sprint);
  }

  assert!(sprinted);
  let distance = (target - body.position).length();
  assert!(
    distance > 0.5 && distance <= 1.0,
    "settled {distance} from the target"
  );
  assert_eq!(body.engine.state().horizontal_speed, 0.0);
}

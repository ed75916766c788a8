//! Autonomous pursuit: an NPC brain that follows a target.
//!
//! Seeks the target until inside `stop_distance`, runs while farther than
//! `run_after_distance`, and jumps on reflex whenever its body reports being
//! pressed into a wall. There is no path planning.

use bevy::prelude::*;

use super::{ControlSignal, ControlSource, SignalKind, WallSense};

#[derive(Component, Debug, Clone)]
pub struct PursuitBrain {
  pub target: Entity,
  pub stop_distance: f32,
  /// Should be larger than `stop_distance`; not enforced.
  pub run_after_distance: f32,
  /// Entity whose [`WallSense`] this brain may read.
  pub sense: Entity,
  movement: Vec2,
  sprint: bool,
  in_proximity: bool,
}

impl PursuitBrain {
  pub fn new(target: Entity, sense: Entity, stop_distance: f32, run_after_distance: f32) -> Self {
    if stop_distance >= run_after_distance {
      warn!(
        "pursuit stop distance {} is not below run-after distance {}",
        stop_distance, run_after_distance
      );
    }
    Self {
      target,
      stop_distance,
      run_after_distance,
      sense,
      movement: Vec2::ZERO,
      sprint: false,
      in_proximity: false,
    }
  }

  /// Close enough to the target to have stopped.
  pub fn in_proximity(&self) -> bool {
    self.in_proximity
  }

  fn apply(&mut self, command: PursuitCommand) {
    match command {
      PursuitCommand::Seek { movement, sprint } => {
        self.movement = movement;
        self.sprint = sprint;
        self.in_proximity = false;
      }
      PursuitCommand::Hold => {
        // Sprint is left as it was; it has no effect while idle.
        self.movement = Vec2::ZERO;
        self.in_proximity = true;
      }
    }
  }
}

impl ControlSource for PursuitBrain {
  fn movement(&self) -> Vec2 {
    self.movement
  }

  fn sprint(&self) -> bool {
    self.sprint
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PursuitCommand {
  /// Head towards the target. `movement` is a unit `(right, forward)` vector
  /// in world axes.
  Seek { movement: Vec2, sprint: bool },
  Hold,
}

/// Seek/stop decision for a pursuer at `from` chasing `to`, on the ground
/// plane.
pub fn pursue(from: Vec3, to: Vec3, stop_distance: f32, run_after_distance: f32) -> PursuitCommand {
  let delta = to - from;
  let offset = Vec2::new(delta.x, delta.z);
  let distance = offset.length();
  if distance > stop_distance {
    // World +X is right and -Z is forward.
    let movement = Vec2::new(offset.x, -offset.y).normalize_or_zero();
    PursuitCommand::Seek {
      movement,
      sprint: distance > run_after_distance,
    }
  } else {
    PursuitCommand::Hold
  }
}

pub fn update_pursuit(
  mut brains: Query<(Entity, &mut PursuitBrain, &Transform)>,
  targets: Query<&Transform>,
  senses: Query<&WallSense>,
  mut signals: MessageWriter<ControlSignal>,
) {
  for (entity, mut brain, transform) in &mut brains {
    let Ok(target) = targets.get(brain.target) else {
      warn_once!("pursuit target {:?} no longer exists", brain.target);
      brain.apply(PursuitCommand::Hold);
      continue;
    };

    let command = pursue(
      transform.translation,
      target.translation,
      brain.stop_distance,
      brain.run_after_distance,
    );
    brain.apply(command);

    if senses.get(brain.sense).is_ok_and(|sense| sense.0) {
      signals.write(ControlSignal {
        source: entity,
        kind: SignalKind::Jump,
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use bevy::ecs::message::Messages;

  use super::*;

  #[test]
  fn far_target_is_chased_at_a_run() {
    let command = pursue(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), 1.0, 5.0);
    assert_eq!(
      command,
      PursuitCommand::Seek {
        movement: Vec2::Y,
        sprint: true
      }
    );
  }

  #[test]
  fn mid_range_target_is_walked_to() {
    let command = pursue(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), 1.0, 5.0);
    assert_eq!(
      command,
      PursuitCommand::Seek {
        movement: Vec2::X,
        sprint: false
      }
    );
  }

  #[test]
  fn close_target_stops() {
    let command = pursue(Vec3::ZERO, Vec3::new(0.3, 0.0, 0.4), 1.0, 5.0);
    assert_eq!(command, PursuitCommand::Hold);
  }

  #[test]
  fn height_difference_is_ignored() {
    let command = pursue(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.5), 1.0, 5.0);
    assert_eq!(command, PursuitCommand::Hold);
  }

  #[test]
  fn holding_zeroes_movement_and_keeps_sprint() {
    let mut brain = PursuitBrain::new(Entity::PLACEHOLDER, Entity::PLACEHOLDER, 1.0, 5.0);
    brain.apply(pursue(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0, 5.0));
    assert!(brain.sprint());
    brain.apply(pursue(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), 1.0, 5.0));
    assert_eq!(brain.movement(), Vec2::ZERO);
    assert!(brain.in_proximity());
  }

  #[test]
  fn wall_sense_raises_jump() {
    let mut app = App::new();
    app
      .add_message::<ControlSignal>()
      .add_systems(Update, update_pursuit);

    let target = app
      .world_mut()
      .spawn(Transform::from_xyz(0.0, 0.0, -10.0))
      .id();
    let npc = app.world_mut().spawn((Transform::default(), WallSense(true))).id();
    app
      .world_mut()
      .entity_mut(npc)
      .insert(PursuitBrain::new(target, npc, 1.0, 5.0));

    app.update();

    let brain = app.world().get::<PursuitBrain>(npc).unwrap();
    assert_eq!(brain.movement(), Vec2::Y);
    assert!(brain.sprint());

    let messages = app.world().resource::<Messages<ControlSignal>>();
    let mut cursor = messages.get_cursor();
    let raised: Vec<_> = cursor.read(messages).copied().collect();
    assert_eq!(
      raised,
      vec![ControlSignal {
        source: npc,
        kind: SignalKind::Jump
      }]
    );
  }
}

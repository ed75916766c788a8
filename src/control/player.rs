//! Human control source.

use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::{ControlSignal, ControlSource, SignalKind};
use crate::input::{Crouch, Jump, Move, PlayerInput, Sprint, Strafe};

/// One tick of raw player input.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputFrame {
  pub movement: Vec2,
  pub sprint: bool,
  pub jump: bool,
  pub strafe: bool,
  pub crouch: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct Held {
  jump: bool,
  strafe: bool,
  crouch: bool,
}

/// Keyboard, mouse and gamepad driven brain. Movement is meant to be read
/// relative to the camera.
#[derive(Component, Debug, Default)]
pub struct PlayerBrain {
  movement: Vec2,
  sprint: bool,
  /// Aim mode; flips together with the strafe signal.
  pub aiming: bool,
  held: Held,
}

impl PlayerBrain {
  /// Updates continuous intent and raises a signal on each button press.
  pub fn update(&mut self, frame: &InputFrame, mut raise: impl FnMut(SignalKind)) {
    self.movement = frame.movement;
    self.sprint = frame.sprint;

    if frame.jump && !self.held.jump {
      raise(SignalKind::Jump);
    }
    if frame.strafe && !self.held.strafe {
      self.aiming = !self.aiming;
      raise(SignalKind::StrafeToggle);
    }
    if frame.crouch && !self.held.crouch {
      raise(SignalKind::CrouchToggle);
    }

    self.held = Held {
      jump: frame.jump,
      strafe: frame.strafe,
      crouch: frame.crouch,
    };
  }
}

impl ControlSource for PlayerBrain {
  fn movement(&self) -> Vec2 {
    self.movement
  }

  fn sprint(&self) -> bool {
    self.sprint
  }
}

fn is_active(state: &ActionState) -> bool {
  // Fired = just pressed, Ongoing = held
  matches!(state, ActionState::Fired | ActionState::Ongoing)
}

fn pressed<A: InputAction>(
  actions: &Actions<PlayerInput>,
  states: &Query<&ActionState, With<Action<A>>>,
) -> bool {
  actions
    .iter()
    .filter_map(|entity| states.get(entity).ok())
    .any(is_active)
}

pub fn read_player_input(
  mut players: Query<(Entity, &mut PlayerBrain, &Actions<PlayerInput>)>,
  move_actions: Query<(&Action<Move>, &ActionState)>,
  sprint_actions: Query<&ActionState, With<Action<Sprint>>>,
  jump_actions: Query<&ActionState, With<Action<Jump>>>,
  strafe_actions: Query<&ActionState, With<Action<Strafe>>>,
  crouch_actions: Query<&ActionState, With<Action<Crouch>>>,
  mut signals: MessageWriter<ControlSignal>,
) {
  for (entity, mut brain, actions) in &mut players {
    let mut movement = Vec2::ZERO;
    for action_entity in actions.iter() {
      if let Ok((action, action_state)) = move_actions.get(action_entity) {
        if is_active(action_state) {
          movement = **action;
        }
      }
    }

    let frame = InputFrame {
      movement,
      sprint: pressed(actions, &sprint_actions),
      jump: pressed(actions, &jump_actions),
      strafe: pressed(actions, &strafe_actions),
      crouch: pressed(actions, &crouch_actions),
    };
    brain.update(&frame, |kind| {
      signals.write(ControlSignal {
        source: entity,
        kind,
      });
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn collect(brain: &mut PlayerBrain, frame: InputFrame) -> Vec<SignalKind> {
    let mut raised = Vec::new();
    brain.update(&frame, |kind| raised.push(kind));
    raised
  }

  #[test]
  fn signals_fire_once_per_press() {
    let mut brain = PlayerBrain::default();
    let held = InputFrame {
      jump: true,
      ..default()
    };
    assert_eq!(collect(&mut brain, held), vec![SignalKind::Jump]);
    assert!(collect(&mut brain, held).is_empty());
    assert!(collect(&mut brain, InputFrame::default()).is_empty());
    assert_eq!(collect(&mut brain, held), vec![SignalKind::Jump]);
  }

  #[test]
  fn strafe_press_flips_aim() {
    let mut brain = PlayerBrain::default();
    let press = InputFrame {
      strafe: true,
      ..default()
    };
    assert_eq!(collect(&mut brain, press), vec![SignalKind::StrafeToggle]);
    assert!(brain.aiming);
    collect(&mut brain, InputFrame::default());
    collect(&mut brain, press);
    assert!(!brain.aiming);
  }

  #[test]
  fn intent_follows_latest_frame() {
    let mut brain = PlayerBrain::default();
    let frame = InputFrame {
      movement: Vec2::new(-1.0, 0.0),
      sprint: true,
      crouch: true,
      ..default()
    };
    assert_eq!(collect(&mut brain, frame), vec![SignalKind::CrouchToggle]);
    assert_eq!(brain.movement(), Vec2::new(-1.0, 0.0));
    assert!(brain.sprint());
  }
}

use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::actions::{Crouch, Jump, Look, Move, PlayerInput, Sprint, Strafe};

pub fn player_input_actions() -> impl Bundle {
  actions!(PlayerInput[
      (
          Action::<Move>::new(),
          Bindings::spawn((
              Cardinal::wasd_keys(),
              Cardinal::arrows(),
              Axial::left_stick(),
          )),
      ),
      (
          Action::<Look>::new(),
          Bindings::spawn((
              Spawn(Binding::mouse_motion()),
              Axial::right_stick(),
          )),
      ),
      (
          Action::<Sprint>::new(),
          bindings![KeyCode::ShiftLeft, GamepadButton::LeftThumb],
      ),
      (
          Action::<Jump>::new(),
          bindings![KeyCode::Space, GamepadButton::South],
      ),
      (
          Action::<Strafe>::new(),
          bindings![MouseButton::Right, GamepadButton::LeftTrigger2],
      ),
      (
          Action::<Crouch>::new(),
          bindings![KeyCode::KeyC, GamepadButton::East],
      ),
  ])
}

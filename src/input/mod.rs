//! Device bindings for the human control source. Move/Sprint/Jump/Strafe/
//! Crouch feed [`crate::control::PlayerBrain`]; Look drives the camera rig.

pub mod actions;
mod bindings;

pub use actions::{Crouch, Jump, Look, Move, PlayerInput, Sprint, Strafe};
use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;
pub use bindings::player_input_actions;

pub struct InputPlugin;

impl Plugin for InputPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(EnhancedInputPlugin)
      .add_input_context::<PlayerInput>();
  }
}

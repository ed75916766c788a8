//! Third-person character locomotion for Bevy, with pluggable control
//! sources (human input, pursuit AI) driving a Rapier capsule mover.

pub mod config;
pub mod control;
pub mod core;
pub mod input;
pub mod locomotion;
#[cfg(feature = "tracy")]
pub mod tracy_init;
pub mod world;

use bevy::prelude::*;

/// Input, control sources and locomotion. Expects Rapier to be installed,
/// e.g. through [`core::CorePlugin`].
pub struct ThirdPersonPlugin;

impl Plugin for ThirdPersonPlugin {
  fn build(&self, app: &mut App) {
    app.add_plugins((
      input::InputPlugin,
      control::ControlPlugin,
      locomotion::LocomotionPlugin,
    ));
  }
}

//! Third-person character locomotion.
//!
//! The pure per-tick logic lives in [`engine`]; [`systems`] wires it to the
//! control sources and to Rapier's kinematic character controller.

pub mod components;
pub mod engine;
pub mod settings;
pub mod smoothing;
pub mod snapshot;
mod spawn;
pub mod systems;
pub mod wall;

#[cfg(test)]
mod tests;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub use components::{CapsuleShape, Character, CharacterHull, GroundContact, JumpStarted};
pub use engine::LocomotionEngine;
pub use settings::{CapsuleDims, CharacterConfig, LocomotionSettings, SettingsError};
pub use snapshot::AnimationSnapshot;
pub use spawn::{character_bundle, spawn_character};

use crate::control::ControlSet;

/// Ordering of the locomotion systems inside the fixed tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
  Probe,
  Signals,
  Tick,
  Apply,
  /// After Rapier has moved the capsules.
  Feedback,
}

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
  fn build(&self, app: &mut App) {
    app
      .register_type::<AnimationSnapshot>()
      .add_message::<JumpStarted>()
      .configure_sets(
        FixedUpdate,
        (
          LocomotionSet::Probe,
          LocomotionSet::Signals,
          LocomotionSet::Tick,
          LocomotionSet::Apply,
        )
          .chain()
          .after(ControlSet::Sample)
          .before(PhysicsSet::SyncBackend),
      )
      .configure_sets(
        FixedUpdate,
        LocomotionSet::Feedback.after(PhysicsSet::Writeback),
      )
      .add_systems(
        FixedUpdate,
        (
          systems::probe_ground.in_set(LocomotionSet::Probe),
          systems::deliver_signals.in_set(LocomotionSet::Signals),
          systems::tick_locomotion.in_set(LocomotionSet::Tick),
          (systems::apply_capsule, systems::apply_motion).in_set(LocomotionSet::Apply),
          systems::read_mover_output.in_set(LocomotionSet::Feedback),
        ),
      );
  }
}

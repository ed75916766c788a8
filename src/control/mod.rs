//! Control sources: the "brains" that drive a locomotion engine.
//!
//! A control source is any component implementing [`ControlSource`]. Its
//! continuous intent (movement and sprint) is sampled into [`ControlIntent`]
//! every fixed tick. Discrete actions are pushed as [`ControlSignal`]
//! messages tagged with the source entity, and an engine only reacts to the
//! source named by its [`ControlBinding`], so several engines may follow one
//! source.

pub mod player;
pub mod pursuit;

use std::marker::PhantomData;

use bevy::prelude::*;

pub use player::PlayerBrain;
pub use pursuit::{PursuitBrain, PursuitCommand, pursue};

/// Continuous intent queried from a brain.
pub trait ControlSource: Component {
  /// Desired planar direction as `(right, forward)`. Any magnitude; zero
  /// means stand still.
  fn movement(&self) -> Vec2;
  fn sprint(&self) -> bool;
}

/// Latest sampled intent of a control source.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlIntent {
  pub movement: Vec2,
  pub sprint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
  Jump,
  StrafeToggle,
  CrouchToggle,
}

/// A discrete action raised by a control source.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSignal {
  pub source: Entity,
  pub kind: SignalKind,
}

/// Which control source an engine listens to. Set once at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
  pub source: Entity,
}

/// Whether the bound engine is pressing into a wall. Written only by the
/// locomotion systems; brains get read access through a query.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WallSense(pub bool);

/// Ordering inside the fixed tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSet {
  /// Brains update their state and raise signals.
  Think,
  /// Brain state is copied into [`ControlIntent`].
  Sample,
}

pub struct ControlPlugin;

impl Plugin for ControlPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_message::<ControlSignal>()
      .configure_sets(FixedUpdate, (ControlSet::Think, ControlSet::Sample).chain())
      .add_plugins((
        ControlSourcePlugin::<PlayerBrain>::default(),
        ControlSourcePlugin::<PursuitBrain>::default(),
      ))
      .add_systems(
        FixedUpdate,
        (player::read_player_input, pursuit::update_pursuit).in_set(ControlSet::Think),
      );
  }
}

/// Registers sampling for one kind of control source.
pub struct ControlSourcePlugin<S: ControlSource>(PhantomData<S>);

impl<S: ControlSource> Default for ControlSourcePlugin<S> {
  fn default() -> Self {
    Self(PhantomData)
  }
}

impl<S: ControlSource> Plugin for ControlSourcePlugin<S> {
  fn build(&self, app: &mut App) {
    app.add_systems(FixedUpdate, sample_control::<S>.in_set(ControlSet::Sample));
  }
}

pub fn sample_control<S: ControlSource>(mut sources: Query<(&S, &mut ControlIntent)>) {
  for (source, mut intent) in &mut sources {
    let sampled = ControlIntent {
      movement: source.movement(),
      sprint: source.sprint(),
    };
    // Avoid tripping change detection every tick.
    intent.set_if_neq(sampled);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Component)]
  struct Scripted(Vec2, bool);

  impl ControlSource for Scripted {
    fn movement(&self) -> Vec2 {
      self.0
    }

    fn sprint(&self) -> bool {
      self.1
    }
  }

  #[test]
  fn sampling_copies_brain_intent() {
    let mut app = App::new();
    app.add_systems(Update, sample_control::<Scripted>);

    let brain = app
      .world_mut()
      .spawn((Scripted(Vec2::new(0.5, 1.0), true), ControlIntent::default()))
      .id();
    app.update();

    let intent = app.world().get::<ControlIntent>(brain).unwrap();
    assert_eq!(intent.movement, Vec2::new(0.5, 1.0));
    assert!(intent.sprint);
  }

  #[test]
  fn unsampled_intent_is_zero() {
    let intent = ControlIntent::default();
    assert_eq!(intent.movement, Vec2::ZERO);
    assert!(!intent.sprint);
  }
}

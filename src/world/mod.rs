//! Demo arena: floor, boundary walls, random steps, the player and the
//! pursuing NPCs.

mod actors;
mod arena;

use bevy::prelude::*;

pub use actors::{BodyVisual, Npc, Player, Wanderer};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_systems(Startup, (arena::spawn_arena, actors::spawn_actors).chain())
      .add_systems(Update, (actors::wander, actors::fit_body_visuals));
  }
}

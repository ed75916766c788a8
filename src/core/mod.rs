pub mod camera;
pub mod physics;

use bevy::prelude::*;
use bevy::transform::TransformSystems;
pub use camera::{CameraRig, CameraTarget, GameCamera, ViewHeading};
pub use physics::layers;

/// Physics backend and the follow camera. Headless setups only need
/// [`physics::PhysicsPlugin`].
pub struct CorePlugin;

impl Plugin for CorePlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<ViewHeading>()
      .add_plugins(physics::PhysicsPlugin)
      .add_systems(Startup, (camera::setup_camera, camera::lock_cursor))
      .add_systems(Update, camera::rotate_rig)
      .add_systems(PostUpdate, camera::camera_follow.before(TransformSystems::Propagate));
  }
}

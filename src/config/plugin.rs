#[cfg(not(target_family = "wasm"))]
use bevy::{asset::AssetEvent, ecs::message::MessageReader};
use bevy::{prelude::*, window::PrimaryWindow};
#[cfg(not(target_family = "wasm"))]
use bevy_common_assets::toml::TomlAssetPlugin;

#[cfg(not(target_family = "wasm"))]
use super::{CONFIG_ASSET, GameConfig};
use super::ConfigLoaded;
use crate::control::PursuitBrain;
use crate::core::CameraRig;
use crate::locomotion::{CapsuleShape, LocomotionEngine};

/// Installs the startup config and, on native targets, reloads it whenever
/// the asset file changes.
pub struct ConfigPlugin {
  pub initial: ConfigLoaded,
}

#[cfg(not(target_family = "wasm"))]
#[derive(Resource)]
struct ConfigHandle(Handle<GameConfig>);

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app.insert_resource(self.initial.clone());

    // Native: asset-based config with hot-reload
    #[cfg(not(target_family = "wasm"))]
    app
      .add_plugins(TomlAssetPlugin::<GameConfig>::new(&["config.toml"]))
      .add_systems(PreStartup, track_config_asset)
      .add_systems(Update, watch_config_changes);

    app.add_systems(
      Update,
      (
        update_window_on_config_change,
        update_camera_on_config_change,
        update_characters_on_config_change,
      ),
    );
  }
}

#[cfg(not(target_family = "wasm"))]
fn track_config_asset(mut commands: Commands, asset_server: Res<AssetServer>) {
  let handle: Handle<GameConfig> = asset_server.load(CONFIG_ASSET);
  commands.insert_resource(ConfigHandle(handle));
}

#[cfg(not(target_family = "wasm"))]
fn watch_config_changes(
  mut commands: Commands,
  config_handle: Res<ConfigHandle>,
  mut messages: MessageReader<AssetEvent<GameConfig>>,
  configs: Res<Assets<GameConfig>>,
) {
  for event in messages.read() {
    if let AssetEvent::Modified { id } = event {
      if config_handle.0.id() == *id {
        if let Some(config) = configs.get(&config_handle.0) {
          match ConfigLoaded::try_from(config.clone()) {
            Ok(loaded) => {
              info!("Config reloaded!");
              commands.insert_resource(loaded);
            }
            Err(e) => error!("Config reload rejected, keeping previous: {}", e),
          }
        }
      }
    }
  }
}

fn update_window_on_config_change(
  config: Res<ConfigLoaded>,
  mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
  if config.is_changed() {
    if let Ok(mut window) = windows.single_mut() {
      window
        .resolution
        .set(config.window.width as f32, config.window.height as f32);
      window.title.clone_from(&config.window.title);
    }
  }
}

fn update_camera_on_config_change(config: Res<ConfigLoaded>, rig: Option<ResMut<CameraRig>>) {
  if !config.is_changed() {
    return;
  }
  let Some(mut rig) = rig else {
    return;
  };
  let camera = &config.camera;
  rig.distance = camera.distance;
  rig.focus_height = camera.focus_height;
  rig.sensitivity = camera.sensitivity;
  rig.top_clamp = camera.top_clamp.to_radians();
  rig.bottom_clamp = camera.bottom_clamp.to_radians();
  rig.pitch = rig.pitch.max(rig.bottom_clamp).min(rig.top_clamp);
}

/// Pushes reloaded settings into every live character. Motion state is kept.
pub(crate) fn update_characters_on_config_change(
  config: Res<ConfigLoaded>,
  mut characters: Query<(&mut LocomotionEngine, &mut CapsuleShape)>,
  mut pursuers: Query<&mut PursuitBrain>,
) {
  if !config.is_changed() {
    return;
  }

  for (mut engine, mut shape) in &mut characters {
    if engine.settings() == &config.settings {
      continue;
    }
    engine.set_settings(config.settings.clone());
    shape.set_if_neq(CapsuleShape(engine.capsule()));
  }
  for mut brain in &mut pursuers {
    brain.stop_distance = config.pursuit.stop_distance;
    brain.run_after_distance = config.pursuit.run_after_distance;
  }
  debug!(
    "Applied settings to {} characters, {} pursuers",
    characters.iter().count(),
    pursuers.iter().count()
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_config;
  use crate::locomotion::LocomotionSettings;

  fn loaded() -> ConfigLoaded {
    let config = parse_config(include_str!("../../assets/config/game.config.toml")).unwrap();
    ConfigLoaded::try_from(config).unwrap()
  }

  #[test]
  fn reload_retunes_characters_without_resetting_them() {
    let mut app = App::new();
    app
      .insert_resource(loaded())
      .add_systems(Update, update_characters_on_config_change);

    let settings = LocomotionSettings::default();
    let mut engine = LocomotionEngine::new(settings.clone(), false);
    engine.toggle_crouch();
    let entity = app
      .world_mut()
      .spawn((CapsuleShape(engine.capsule()), engine))
      .id();
    app.update();

    let mut retuned = loaded();
    retuned.character.capsule_height = 2.0;
    retuned.character.move_speed = 3.0;
    retuned.settings = LocomotionSettings::validate(&retuned.character).unwrap();
    app.insert_resource(retuned);
    app.update();

    let engine = app.world().get::<LocomotionEngine>(entity).unwrap();
    assert!(engine.state().crouching);
    assert_eq!(engine.settings().base_speed, 3.0);
    let shape = app.world().get::<CapsuleShape>(entity).unwrap();
    assert_eq!(shape.0.height, 1.0);
  }
}

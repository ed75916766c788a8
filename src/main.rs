use std::path::PathBuf;

use bevy::{
  prelude::*,
  window::{PresentMode, WindowResolution},
};
use clap::Parser;
use third_person::config::{self, ConfigLoaded};

/// Third-person locomotion demo.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
  /// Game config file. Hot reload only watches the bundled asset.
  #[arg(long, default_value = "assets/config/game.config.toml")]
  config: PathBuf,
  /// Number of pursuing NPCs, overriding the config.
  #[arg(long)]
  npcs: Option<usize>,
  /// Arena layout seed, overriding the config.
  #[arg(long)]
  seed: Option<u64>,
  /// NPCs chase a wandering marker instead of the player.
  #[arg(long)]
  wanderer: bool,
}

fn main() {
  // WASM: set up panic hook for better error messages
  #[cfg(target_family = "wasm")]
  console_error_panic_hook::set_once();

  let cli = Cli::parse();

  // WASM: embed config at compile time (no filesystem access)
  #[cfg(target_family = "wasm")]
  let game_config = config::parse_config(include_str!("../assets/config/game.config.toml"))
    .expect("Failed to parse config");
  #[cfg(not(target_family = "wasm"))]
  let game_config = config::load_config(&cli.config).expect("Failed to load config");

  let mut loaded = ConfigLoaded::try_from(game_config).expect("Invalid config");
  if let Some(npcs) = cli.npcs {
    loaded.arena.npc_count = npcs;
  }
  if let Some(seed) = cli.seed {
    loaded.arena.seed = seed;
  }
  loaded.arena.chase_wanderer |= cli.wanderer;

  #[cfg(feature = "tracy")]
  third_person::tracy_init::init_tracy();

  let window = Window {
    resolution: WindowResolution::new(loaded.window.width, loaded.window.height),
    title: loaded.window.title.clone(),
    // WASM: only Fifo (vsync) is supported on WebGL2
    #[cfg(target_family = "wasm")]
    present_mode: PresentMode::Fifo,
    #[cfg(not(target_family = "wasm"))]
    present_mode: PresentMode::AutoVsync,
    #[cfg(target_family = "wasm")]
    canvas: Some("#bevy".to_string()),
    #[cfg(target_family = "wasm")]
    fit_canvas_to_parent: true,
    ..default()
  };

  let plugins = DefaultPlugins.set(WindowPlugin {
    primary_window: Some(window),
    ..default()
  });
  #[cfg(feature = "tracy")]
  let plugins = plugins.disable::<bevy::log::LogPlugin>();

  let mut app = App::new();
  app
    .insert_resource(Time::<Fixed>::from_hz(60.0))
    .add_plugins(plugins)
    .add_plugins(config::ConfigPlugin { initial: loaded })
    .add_plugins(third_person::core::CorePlugin)
    .add_plugins(third_person::ThirdPersonPlugin)
    .add_plugins(third_person::world::WorldPlugin);

  app.run();
}

//! Astro: a headless run of the arcade shooter
//!
//! Usage: `astro [CONFIG]`. The configuration file (TOML or RON) defaults to
//! `astro.toml`; a missing file means default settings.

mod config;
mod game;

use std::path::{Path, PathBuf};

use astro_engine::config::Config;

use crate::config::GameConfig;
use crate::game::{demo_script, Game, GameError};

fn main() -> Result<(), GameError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("astro.toml"), PathBuf::from);

    run(&config_path).map_err(|err| {
        log::error!("Astro aborted: {}", err);
        err
    })
}

fn run(config_path: &Path) -> Result<(), GameError> {
    let config = GameConfig::load_or_default(config_path)?;
    log::info!(
        "Starting Astro: {}x{} at {} fps, {} frames",
        config.world.screen_width,
        config.world.screen_height,
        config.max_fps,
        config.demo_frames
    );

    let mut game = Game::new(config)?;
    game.spawn_enemy_wave(&mut rand::thread_rng())?;
    log::info!("World ready with {} entities", game.world().len());

    let script = demo_script(game.config().demo_frames);
    let summary = game.run(&script)?;
    log::info!(
        "Astro finished after {} frames: {} shots, {} collisions, {} removed, {} enemies left, player {}",
        summary.frames,
        summary.fired,
        summary.collisions,
        summary.removed,
        summary.enemies_left,
        if summary.player_alive { "alive" } else { "destroyed" }
    );

    let dropped = game.teardown();
    log::debug!("{} entities dropped at shutdown", dropped);
    Ok(())
}

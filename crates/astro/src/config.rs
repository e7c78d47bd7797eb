//! Game configuration

use std::path::PathBuf;

use astro_engine::config::{Config, Deserialize, Serialize, WorldConfig};
use astro_engine::templates::DEFAULT_LOAD_ORDER;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play area shared by every entity
    pub world: WorldConfig,

    /// Frames simulated per second
    pub max_fps: u32,

    /// Root of the template category directories
    pub template_dir: PathBuf,

    /// Directory sprite paths are resolved against
    pub asset_dir: PathBuf,

    /// Template categories, loaded in this order
    pub load_order: Vec<String>,

    /// Template key of the player's ship
    pub player_ship: String,

    /// Template key of the enemy wave's ships
    pub enemy_ship: String,

    /// Number of enemy ships in the wave
    pub enemy_count: usize,

    /// Frames played before the scripted quit
    pub demo_frames: u32,

    /// Where to save the last frame, if anywhere
    pub screenshot: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            world: WorldConfig::default(),
            max_fps: 60,
            template_dir: root.join("config"),
            asset_dir: root.join("assets"),
            load_order: DEFAULT_LOAD_ORDER.iter().map(ToString::to_string).collect(),
            player_ship: "testship".to_string(),
            enemy_ship: "drone".to_string(),
            enemy_count: 3,
            demo_frames: 600,
            screenshot: None,
        }
    }
}

impl Config for GameConfig {}

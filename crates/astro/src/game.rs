//! A headless game session: template loading, the enemy wave and the
//! fixed-step frame loop driven by scripted input

use std::path::Path;
use std::sync::Arc;

use astro_engine::assets::{AssetError, FileAssetLoader, ImageData};
use astro_engine::config::ConfigError;
use astro_engine::entity::Entity;
use astro_engine::foundation::collections::EntityId;
use astro_engine::foundation::math::Vec2;
use astro_engine::foundation::time::{FixedStep, FrameClock};
use astro_engine::input::{Action, Command, InputEvent, InputManager, KeyCode};
use astro_engine::templates::{ShipTemplate, TemplateError, TemplateRegistry};
use astro_engine::types::{RegistryError, TypeRegistry};
use astro_engine::world::{FrameReport, World, WorldError};
use rand::Rng;
use thiserror::Error;

use crate::config::GameConfig;

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Everything that can stop the game
#[derive(Error, Debug)]
pub enum GameError {
    /// Settings could not be read
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// The builtin kinds did not register
    #[error("kind registry: {0}")]
    Types(#[from] RegistryError),

    /// Template loading failed
    #[error("templates: {0}")]
    Templates(#[from] TemplateError),

    /// The frame loop failed
    #[error(transparent)]
    World(#[from] WorldError),

    /// The screenshot could not be written
    #[error("screenshot: {0}")]
    Asset(#[from] AssetError),

    /// The configured ship key names no ship template
    #[error("no ship template named `{0}`")]
    MissingShip(String),
}

/// Input played back by the demo: `(frame, event)` pairs in frame order,
/// ending with a quit at `frames`
pub fn demo_script(frames: u32) -> Vec<(u32, InputEvent)> {
    let mut script = vec![
        (1, InputEvent::KeyDown(KeyCode::Space)),
        (30, InputEvent::KeyDown(KeyCode::Left)),
        (90, InputEvent::KeyUp(KeyCode::Left)),
        (120, InputEvent::KeyDown(KeyCode::Right)),
        (240, InputEvent::KeyUp(KeyCode::Right)),
        (260, InputEvent::KeyDown(KeyCode::Up)),
        (300, InputEvent::KeyUp(KeyCode::Up)),
        (420, InputEvent::KeyUp(KeyCode::Space)),
    ];
    script.retain(|(frame, _)| *frame < frames);
    script.push((frames, InputEvent::KeyDown(KeyCode::Escape)));
    script
}

/// Totals of one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Frames simulated
    pub frames: u32,
    /// Projectiles fired by every ship
    pub fired: usize,
    /// Collisions resolved
    pub collisions: usize,
    /// Entities removed
    pub removed: usize,
    /// Enemy ships still alive at the end
    pub enemies_left: usize,
    /// Whether the player's ship survived
    pub player_alive: bool,
}

impl Summary {
    fn record(&mut self, report: FrameReport) {
        self.frames += 1;
        self.fired += report.fired;
        self.collisions += report.collisions;
        self.removed += report.removed;
    }
}

/// One game: the loaded templates and the world they populate
pub struct Game {
    config: GameConfig,
    templates: TemplateRegistry,
    world: World,
    input: InputManager,
    player: EntityId,
    enemies: Vec<EntityId>,
}

impl Game {
    /// Load every template and place the player's ship
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let types = Arc::new(TypeRegistry::builtin()?);
        let mut templates = TemplateRegistry::new(Arc::clone(&types));
        let count = templates.load_all(&config.template_dir, config.load_order.as_slice())?;
        log::info!("Loaded {} templates from {}", count, config.template_dir.display());

        let assets = FileAssetLoader::new(config.asset_dir.clone());
        let mut world = World::init(config.world.clone(), types, Box::new(assets));
        let player_ship = ship_template(&templates, &config.player_ship)?;
        let player = world.spawn_player_ship(&player_ship)?;

        Ok(Self {
            config,
            templates,
            world,
            input: InputManager::default(),
            player,
            enemies: Vec::new(),
        })
    }

    /// Settings of this session
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// World being played
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Place the enemy wave at random points in the upper part of the
    /// screen, every ship firing
    pub fn spawn_enemy_wave(&mut self, rng: &mut impl Rng) -> Result<usize, GameError> {
        let template = ship_template(&self.templates, &self.config.enemy_ship)?;
        let (width, height) = (self.config.world.screen_width, self.config.world.screen_height);

        for _ in 0..self.config.enemy_count {
            let position = Vec2::new(
                rng.gen_range(0.1_f32..0.9) * width,
                rng.gen_range(0.1_f32..0.3) * height,
            );
            let mut enemy = Entity::ship(&template);
            if let Some(ship) = enemy.as_ship_mut() {
                ship.start_firing();
            }
            let id = self.world.spawn(enemy, position, Vec2::zeros())?;
            self.enemies.push(id);
        }

        log::info!("Enemy wave of {} {} ships spawned", self.config.enemy_count, template.key);
        Ok(self.config.enemy_count)
    }

    /// Play frames until the script asks to quit. `script` is a list of
    /// `(frame, event)` pairs in frame order.
    pub fn run(&mut self, script: &[(u32, InputEvent)]) -> Result<Summary, GameError> {
        let mut steps = FixedStep::from_fps(self.config.max_fps);
        let mut clock = FrameClock::new();
        let mut summary = Summary::default();
        let mut events = script.iter().peekable();
        let mut player_alive = true;
        let mut frame = 0;

        'frames: loop {
            while let Some(&(_, event)) = events.next_if(|(at, _)| *at <= frame) {
                if self.handle(event) == Command::Quit {
                    log::info!("Quit requested at frame {}", frame);
                    break 'frames;
                }
            }
            if events.peek().is_none() {
                log::warn!("Input script ended without a quit at frame {}", frame);
                break;
            }

            if let Some(tick) = clock.sample(steps.next_timestamp()) {
                let report = self.world.step(tick)?;
                if report.collisions > 0 || report.removed > 0 {
                    log::debug!(
                        "Frame {}: {} collisions, {} entities removed",
                        frame,
                        report.collisions,
                        report.removed
                    );
                }
                summary.record(report);
            }

            if player_alive && !self.world.is_alive(self.player) {
                player_alive = false;
                log::info!("Player ship destroyed at frame {}", frame);
            }
            frame += 1;
        }

        summary.enemies_left = self.enemies.iter().filter(|&&id| self.world.is_alive(id)).count();
        summary.player_alive = self.world.is_alive(self.player);
        if let Some(path) = &self.config.screenshot {
            self.screenshot(path)?;
        }
        Ok(summary)
    }

    /// Drop every entity
    pub fn teardown(&mut self) -> usize {
        self.enemies.clear();
        self.world.teardown()
    }

    fn handle(&mut self, event: InputEvent) -> Command {
        let ship = self
            .world
            .get_mut(self.player)
            .filter(|entity| entity.is_alive())
            .and_then(Entity::as_ship_mut);

        match (ship, event) {
            (Some(ship), event) => self.input.handle(event, ship),
            (None, InputEvent::Quit) => Command::Quit,
            (None, InputEvent::KeyDown(key)) if self.input.bindings().action(key) == Some(Action::Quit) => {
                Command::Quit
            }
            (None, _) => Command::Continue,
        }
    }

    fn screenshot(&self, path: &Path) -> Result<(), GameError> {
        let mut frame = ImageData::solid_color(
            self.config.world.screen_width as u32,
            self.config.world.screen_height as u32,
            BACKGROUND,
        );
        self.world.draw(&mut frame);
        frame.save(path)?;
        log::info!("Saved last frame to {}", path.display());
        Ok(())
    }
}

fn ship_template(templates: &TemplateRegistry, key: &str) -> Result<Arc<ShipTemplate>, GameError> {
    templates
        .ship(key)
        .ok_or_else(|| GameError::MissingShip(key.to_string()))
}

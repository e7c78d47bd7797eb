//! Live entities built from templates
//!
//! An entity goes through `Uninitialized -> Placed -> Active -> Removed`.
//! It is built from a template, placed (which loads its sprite), ticked
//! every frame while alive and finally removed by the bounds check, a
//! collision handler or expiry. Removed entities are never revived.

pub mod projectile;
pub mod ship;
pub mod sprite;
pub mod weapon;

pub use projectile::{Lifetime, Projectile, PROJECTILE};
pub use ship::{Ship, ENEMY_SHIP, PLAYER_SHIP, SHIP};
pub use sprite::Sprite;
pub use weapon::{FireRequest, Weapon, WEAPON};

use std::sync::Arc;

use crate::assets::{AssetError, AssetLoader};
use crate::config::WorldConfig;
use crate::foundation::math::{self, Rect, Vec2};
use crate::foundation::time::Tick;
use crate::templates::{ProjectileTemplate, ShipTemplate};
use crate::types::{Capabilities, TypeDescriptor};
use crate::world::Group;

/// Every kind the engine defines, registered by
/// [`TypeRegistry::builtin`](crate::types::TypeRegistry::builtin)
pub static BUILTIN_KINDS: &[&TypeDescriptor] = &[&PROJECTILE, &WEAPON, &SHIP, &PLAYER_SHIP, &ENEMY_SHIP];

/// Lifecycle stage of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Built from a template, sprite not loaded
    Uninitialized,
    /// Positioned and drawable; becomes active on its first tick
    Placed,
    /// Updated every frame
    Active,
    /// Out of the game for good
    Removed,
}

/// Kind-specific state
#[derive(Debug, Clone)]
pub enum Body {
    /// A ship with its weapons
    Ship(Ship),
    /// A projectile in flight
    Projectile(Projectile),
}

/// A live game object
#[derive(Debug, Clone)]
pub struct Entity {
    kind: &'static TypeDescriptor,
    state: EntityState,
    /// Center of the sprite in screen pixels
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    sprite: Option<Sprite>,
    body: Body,
}

impl Entity {
    /// Ship instance of a template
    pub fn ship(template: &Arc<ShipTemplate>) -> Self {
        Self::new(template.kind, Body::Ship(Ship::new(template)))
    }

    /// Projectile instance of a template, spawned at `now`
    pub fn projectile(template: &Arc<ProjectileTemplate>, friendly: bool, now: f32) -> Self {
        Self::new(template.kind, Body::Projectile(Projectile::new(template, friendly, now)))
    }

    fn new(kind: &'static TypeDescriptor, body: Body) -> Self {
        Self {
            kind,
            state: EntityState::Uninitialized,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            sprite: None,
            body,
        }
    }

    /// Kind descriptor
    pub fn kind(&self) -> &'static TypeDescriptor {
        self.kind
    }

    /// Lifecycle stage
    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Placed or active
    pub fn is_alive(&self) -> bool {
        matches!(self.state, EntityState::Placed | EntityState::Active)
    }

    /// Whether the entity is on the player's side
    pub fn is_friendly(&self) -> bool {
        match &self.body {
            Body::Ship(_) => self.kind.has(Capabilities::FRIENDLY),
            Body::Projectile(shot) => shot.is_friendly(),
        }
    }

    /// Group the entity is updated and drawn in
    pub fn group(&self) -> Group {
        match (&self.body, self.is_friendly()) {
            (Body::Ship(_), true) => Group::FriendlyShips,
            (Body::Ship(_), false) => Group::EnemyShips,
            (Body::Projectile(_), true) => Group::FriendlyProjectiles,
            (Body::Projectile(_), false) => Group::EnemyProjectiles,
        }
    }

    /// Kind-specific state
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Ship state, if this is a ship
    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.body {
            Body::Ship(ship) => Some(ship),
            Body::Projectile(_) => None,
        }
    }

    /// Mutable ship state, if this is a ship
    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.body {
            Body::Ship(ship) => Some(ship),
            Body::Projectile(_) => None,
        }
    }

    /// Projectile state, if this is a projectile
    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.body {
            Body::Projectile(shot) => Some(shot),
            Body::Ship(_) => None,
        }
    }

    /// Loaded sprite
    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Screen-space bounding box; empty until the sprite is loaded
    pub fn rect(&self) -> Rect {
        let (width, height) = self.sprite.as_ref().map_or((0, 0), Sprite::size);
        Rect::from_size(self.position, width as f32, height as f32)
    }

    /// Velocity the entity starts with when nothing else is given
    pub fn default_velocity(&self) -> Vec2 {
        match &self.body {
            Body::Ship(_) => Vec2::zeros(),
            Body::Projectile(shot) => shot.velocity(),
        }
    }

    /// Load the sprite and put the entity into the game
    pub fn place(&mut self, position: Vec2, velocity: Vec2, assets: &dyn AssetLoader) -> Result<(), AssetError> {
        if self.state == EntityState::Removed {
            log::warn!("Ignoring placement of a removed {}", self.kind);
            return Ok(());
        }

        let inverted = self.is_friendly();
        let sprite = match &self.body {
            Body::Ship(ship) => {
                let template = ship.template();
                Sprite::load(assets, &template.imagepath, template.engine_glow_imagepath.as_deref(), inverted)?
            }
            Body::Projectile(shot) => Sprite::load(assets, &shot.template().imagepath, None, inverted)?,
        };

        self.sprite = Some(sprite);
        self.position = position;
        self.velocity = velocity;
        self.state = EntityState::Placed;
        log::debug!("Placed {} at ({:.1}, {:.1})", self.kind, position.x, position.y);
        Ok(())
    }

    /// Take the entity out of the game
    pub fn destroy(&mut self) {
        if self.state != EntityState::Removed {
            log::debug!("Removing {} at ({:.1}, {:.1})", self.kind, self.position.x, self.position.y);
            self.state = EntityState::Removed;
        }
    }

    /// Advance one frame. Shots fired by the entity's weapons are appended
    /// to `fired`.
    pub fn tick(&mut self, tick: Tick, config: &WorldConfig, fired: &mut Vec<FireRequest>) {
        match self.state {
            EntityState::Uninitialized | EntityState::Removed => return,
            EntityState::Placed => self.state = EntityState::Active,
            EntityState::Active => {}
        }

        if let Body::Ship(ship) = &self.body {
            if self.kind.has(Capabilities::CONTROLLABLE) {
                self.velocity = ship
                    .controller()
                    .steer(self.velocity, ship.steering().direction(), tick.elapsed);
            }
            ship.controller().clamp_speed(&mut self.velocity);
        }

        self.position += self.velocity * tick.elapsed;
        if !math::is_finite(&self.position) || !math::is_finite(&self.velocity) {
            log::warn!("Removing {} with a non-finite position", self.kind);
            self.destroy();
            return;
        }

        self.check_bounds(config);
        if self.state == EntityState::Removed {
            return;
        }

        let friendly = self.is_friendly();
        let moving = match &mut self.body {
            Body::Ship(ship) => {
                for weapon in ship.weapons_mut() {
                    weapon.tick(tick.elapsed, self.position, friendly, fired);
                }
                ship.steering().is_moving()
            }
            Body::Projectile(shot) => {
                if shot.lifetime().is_expired(tick.now) {
                    self.state = EntityState::Removed;
                    log::debug!("{} expired", self.kind);
                }
                false
            }
        };

        if let Some(sprite) = &mut self.sprite {
            sprite.set_moving(moving);
        }
    }

    /// Confined kinds are clamped inside the screen, losing the velocity
    /// component that pushes outwards. Other kinds are removed once their
    /// center passes the off-screen cutoff.
    fn check_bounds(&mut self, config: &WorldConfig) {
        let (width, height) = (config.screen_width, config.screen_height);

        if self.kind.has(Capabilities::CONFINED) {
            let half = self.rect().half_extents;
            clamp_axis(&mut self.position.x, &mut self.velocity.x, half.x, width - half.x);
            clamp_axis(&mut self.position.y, &mut self.velocity.y, half.y, height - half.y);
            return;
        }

        let cutoff = config.off_screen_cutoff;
        let (x, y) = (self.position.x, self.position.y);
        if x < -cutoff || x > width + cutoff || y < -cutoff || y > height + cutoff {
            log::debug!("{} went off screen", self.kind);
            self.destroy();
        }
    }
}

fn clamp_axis(position: &mut f32, speed: &mut f32, low: f32, high: f32) {
    let high = high.max(low);
    if *position < low {
        *position = low;
        *speed = speed.max(0.0);
    } else if *position > high {
        *position = high;
        *speed = speed.min(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, MemoryAssetLoader};
    use crate::templates::WeaponTemplate;
    use approx::assert_relative_eq;

    fn assets() -> MemoryAssetLoader {
        MemoryAssetLoader::new()
            .with_image("ship.png", ImageData::solid_color(20, 10, [0, 0, 255, 255]))
            .with_image("glow.png", ImageData::solid_color(4, 4, [255, 128, 0, 255]))
            .with_image("bolt.png", ImageData::solid_color(2, 6, [255, 255, 0, 255]))
    }

    fn bolt(lifetime: Option<f32>) -> Arc<ProjectileTemplate> {
        Arc::new(ProjectileTemplate {
            key: "bolt".to_string(),
            kind: &PROJECTILE,
            imagepath: "bolt.png".to_string(),
            speed: 100.0,
            damage: 10.0,
            lifetime,
        })
    }

    fn fighter(kind: &'static TypeDescriptor) -> Arc<ShipTemplate> {
        let blaster = Arc::new(WeaponTemplate {
            key: "blaster".to_string(),
            kind: &WEAPON,
            rate_of_fire: 2.0,
            projectiles: vec![bolt(None)],
        });
        Arc::new(ShipTemplate {
            key: "fighter".to_string(),
            kind,
            imagepath: "ship.png".to_string(),
            engine_glow_imagepath: Some("glow.png".to_string()),
            acceleration: 50.0,
            max_speed: 100.0,
            hp: 100.0,
            weapons: vec![blaster],
        })
    }

    fn placed(mut entity: Entity, position: Vec2, velocity: Vec2) -> Entity {
        entity.place(position, velocity, &assets()).unwrap();
        entity
    }

    #[test]
    fn test_lifecycle() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let mut ship = Entity::ship(&fighter(&ENEMY_SHIP));
        assert_eq!(ship.state(), EntityState::Uninitialized);

        ship.tick(Tick::new(0.0, 1.0), &config, &mut fired);
        assert_eq!(ship.state(), EntityState::Uninitialized);

        ship.place(Vec2::new(100.0, 100.0), Vec2::zeros(), &assets()).unwrap();
        assert_eq!(ship.state(), EntityState::Placed);
        assert_eq!(ship.rect().half_extents, Vec2::new(10.0, 5.0));

        ship.tick(Tick::new(0.0, 0.1), &config, &mut fired);
        assert_eq!(ship.state(), EntityState::Active);

        ship.destroy();
        ship.tick(Tick::new(0.1, 0.1), &config, &mut fired);
        assert_eq!(ship.state(), EntityState::Removed);
        assert_eq!(ship.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_player_steering_and_glow() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let mut ship = placed(Entity::ship(&fighter(&PLAYER_SHIP)), Vec2::new(300.0, 200.0), Vec2::zeros());

        ship.as_ship_mut().unwrap().accel_right();
        ship.tick(Tick::new(1.0, 1.0), &config, &mut fired);

        assert_relative_eq!(ship.velocity, Vec2::new(50.0, 0.0));
        assert_relative_eq!(ship.position, Vec2::new(350.0, 200.0));
        assert!(ship.sprite().unwrap().is_moving());

        ship.as_ship_mut().unwrap().accel_left();
        ship.tick(Tick::new(2.0, 1.0), &config, &mut fired);
        assert_relative_eq!(ship.velocity, Vec2::zeros());
        assert!(!ship.sprite().unwrap().is_moving());
    }

    #[test]
    fn test_enemy_ignores_steering() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let mut ship = placed(Entity::ship(&fighter(&ENEMY_SHIP)), Vec2::new(300.0, 200.0), Vec2::new(0.0, 10.0));

        ship.as_ship_mut().unwrap().accel_left();
        ship.tick(Tick::new(1.0, 1.0), &config, &mut fired);
        assert_relative_eq!(ship.velocity, Vec2::new(0.0, 10.0));
        assert_relative_eq!(ship.position, Vec2::new(300.0, 210.0));
    }

    #[test]
    fn test_confined_ship_clamped() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let mut ship = placed(Entity::ship(&fighter(&ENEMY_SHIP)), Vec2::new(15.0, 470.0), Vec2::new(-100.0, 50.0));

        ship.tick(Tick::new(1.0, 1.0), &config, &mut fired);

        assert_eq!(ship.state(), EntityState::Active);
        assert_relative_eq!(ship.position, Vec2::new(10.0, 475.0));
        assert_relative_eq!(ship.velocity, Vec2::zeros());
    }

    #[test]
    fn test_projectile_removed_past_cutoff() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let shot = Entity::projectile(&bolt(None), true, 0.0);
        let velocity = shot.default_velocity();
        let mut shot = placed(shot, Vec2::new(100.0, -450.0), velocity);

        shot.tick(Tick::new(0.4, 0.4), &config, &mut fired);
        assert_eq!(shot.state(), EntityState::Active);

        shot.tick(Tick::new(0.8, 0.4), &config, &mut fired);
        assert_eq!(shot.state(), EntityState::Removed);
    }

    #[test]
    fn test_projectile_expires() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let shot = Entity::projectile(&bolt(Some(1.0)), false, 0.0);
        let velocity = shot.default_velocity();
        let mut shot = placed(shot, Vec2::new(100.0, 100.0), velocity);

        shot.tick(Tick::new(0.5, 0.5), &config, &mut fired);
        assert_eq!(shot.state(), EntityState::Active);
        shot.tick(Tick::new(1.0, 0.5), &config, &mut fired);
        assert_eq!(shot.state(), EntityState::Removed);
    }

    #[test]
    fn test_speed_cap_applies_to_every_ship_kind() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();

        for kind in [&SHIP, &ENEMY_SHIP, &PLAYER_SHIP] {
            let mut ship = placed(Entity::ship(&fighter(kind)), Vec2::new(300.0, 100.0), Vec2::new(0.0, 150.0));
            ship.tick(Tick::new(0.1, 0.1), &config, &mut fired);

            assert_relative_eq!(ship.velocity, Vec2::new(0.0, 100.0));
            assert_relative_eq!(ship.position, Vec2::new(300.0, 110.0));
        }
    }

    #[test]
    fn test_firing_ship_emits_requests() {
        let config = WorldConfig::default();
        let mut fired = Vec::new();
        let mut ship = placed(Entity::ship(&fighter(&PLAYER_SHIP)), Vec2::new(300.0, 200.0), Vec2::zeros());

        ship.as_ship_mut().unwrap().start_firing();
        ship.tick(Tick::new(0.0, 0.1), &config, &mut fired);

        assert_eq!(fired.len(), 1);
        assert!(fired[0].friendly);
        assert_eq!(fired[0].origin, Vec2::new(300.0, 200.0));
    }

    #[test]
    fn test_groups() {
        assert_eq!(Entity::ship(&fighter(&PLAYER_SHIP)).group(), Group::FriendlyShips);
        assert_eq!(Entity::ship(&fighter(&ENEMY_SHIP)).group(), Group::EnemyShips);
        assert_eq!(Entity::projectile(&bolt(None), true, 0.0).group(), Group::FriendlyProjectiles);
        assert_eq!(Entity::projectile(&bolt(None), false, 0.0).group(), Group::EnemyProjectiles);
    }
}

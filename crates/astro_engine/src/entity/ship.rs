//! Ships and the collision rules that involve them

use std::sync::Arc;

use super::weapon::Weapon;
use super::Entity;
use crate::physics::{KinematicController, Steering};
use crate::templates::ShipTemplate;
use crate::types::{Capabilities, Family, FieldDefault, HandlerFn, TypeDescriptor};

const SHIP_FIELDS: &[&str] = &["imagepath", "acceleration", "max_speed", "weapons"];
const SHIP_DEFAULTS: &[(&str, FieldDefault)] = &[("hp", FieldDefault::Number(100.0))];

/// Root ship kind
pub static SHIP: TypeDescriptor = TypeDescriptor {
    name: "ship",
    family: Family::Ship,
    capabilities: Capabilities::COLLIDABLE.union(Capabilities::CONFINED),
    required_fields: SHIP_FIELDS,
    defaults: SHIP_DEFAULTS,
    handlers: &[("projectile", ship_hit_by_projectile as HandlerFn)],
};

/// Ship flown by the player
pub static PLAYER_SHIP: TypeDescriptor = TypeDescriptor {
    name: "playership",
    family: Family::Ship,
    capabilities: Capabilities::COLLIDABLE
        .union(Capabilities::CONFINED)
        .union(Capabilities::CONTROLLABLE)
        .union(Capabilities::FRIENDLY),
    required_fields: SHIP_FIELDS,
    defaults: SHIP_DEFAULTS,
    handlers: &[
        ("projectile", ship_hit_by_projectile as HandlerFn),
        ("enemyship", ships_ram as HandlerFn),
        ("ship", ships_ram as HandlerFn),
    ],
};

/// Hostile ship
pub static ENEMY_SHIP: TypeDescriptor = TypeDescriptor {
    name: "enemyship",
    family: Family::Ship,
    capabilities: Capabilities::COLLIDABLE
        .union(Capabilities::CONFINED)
        .union(Capabilities::HOSTILE),
    required_fields: SHIP_FIELDS,
    defaults: SHIP_DEFAULTS,
    handlers: &[("projectile", ship_hit_by_projectile as HandlerFn)],
};

/// Hull, weapons and pilot input of a live ship
#[derive(Debug, Clone)]
pub struct Ship {
    template: Arc<ShipTemplate>,
    weapons: Vec<Weapon>,
    controller: KinematicController,
    steering: Steering,
    hp: f32,
}

impl Ship {
    /// Fresh ship with one weapon per template entry
    pub fn new(template: &Arc<ShipTemplate>) -> Self {
        Self {
            template: Arc::clone(template),
            weapons: template.weapons.iter().map(Weapon::new).collect(),
            controller: KinematicController::new(template.acceleration, template.max_speed),
            steering: Steering::default(),
            hp: template.hp,
        }
    }

    /// Template the ship was built from
    pub fn template(&self) -> &Arc<ShipTemplate> {
        &self.template
    }

    /// Mounted weapons
    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub(crate) fn weapons_mut(&mut self) -> &mut [Weapon] {
        &mut self.weapons
    }

    /// Velocity policy
    pub fn controller(&self) -> &KinematicController {
        &self.controller
    }

    /// Held direction input
    pub fn steering(&self) -> &Steering {
        &self.steering
    }

    /// Remaining hit points
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Subtract hit points; returns whether the ship is wrecked
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.hp -= amount.max(0.0);
        self.hp <= 0.0
    }

    /// Hold the trigger of every weapon
    pub fn start_firing(&mut self) {
        self.weapons.iter_mut().for_each(Weapon::start_firing);
    }

    /// Release the trigger of every weapon
    pub fn stop_firing(&mut self) {
        self.weapons.iter_mut().for_each(Weapon::stop_firing);
    }

    /// Press left, or release right
    pub fn accel_left(&mut self) {
        self.steering.accel_left();
    }

    /// Press right, or release left
    pub fn accel_right(&mut self) {
        self.steering.accel_right();
    }

    /// Press up, or release down
    pub fn accel_up(&mut self) {
        self.steering.accel_up();
    }

    /// Press down, or release up
    pub fn accel_down(&mut self) {
        self.steering.accel_down();
    }
}

fn damage(ship: &mut Entity, amount: f32) {
    let wrecked = ship.as_ship_mut().is_some_and(|hull| hull.take_damage(amount));
    if wrecked {
        log::debug!("{} destroyed", ship.kind());
        ship.destroy();
    }
}

/// The projectile is spent and the ship loses its damage in hit points
fn ship_hit_by_projectile(ship: &mut Entity, projectile: &mut Entity) {
    let amount = projectile.as_projectile().map_or(0.0, |shot| shot.damage());
    projectile.destroy();
    damage(ship, amount);
}

/// Each ship takes damage equal to the other's remaining hit points
fn ships_ram(player: &mut Entity, enemy: &mut Entity) {
    let player_hp = player.as_ship().map_or(0.0, Ship::hp);
    let enemy_hp = enemy.as_ship().map_or(0.0, Ship::hp);
    damage(player, enemy_hp);
    damage(enemy, player_hp);
}

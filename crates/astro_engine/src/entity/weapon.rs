//! Ship-mounted weapons

use std::sync::Arc;

use crate::foundation::math::Vec2;
use crate::templates::{ProjectileTemplate, WeaponTemplate};
use crate::types::{Capabilities, Family, TypeDescriptor};

/// Root weapon kind
pub static WEAPON: TypeDescriptor = TypeDescriptor {
    name: "weapon",
    family: Family::Weapon,
    capabilities: Capabilities::empty(),
    required_fields: &["rate_of_fire", "projectiles"],
    defaults: &[],
    handlers: &[],
};

/// A projectile a weapon wants spawned; the world turns it into an entity
#[derive(Debug, Clone)]
pub struct FireRequest {
    /// What to spawn
    pub projectile: Arc<ProjectileTemplate>,
    /// Where to spawn it
    pub origin: Vec2,
    /// Side of the firing ship
    pub friendly: bool,
}

/// Firing state of one mounted weapon
#[derive(Debug, Clone)]
pub struct Weapon {
    template: Arc<WeaponTemplate>,
    firing: bool,
    cooldown: f32,
}

impl Weapon {
    /// Idle, cooled-down weapon
    pub fn new(template: &Arc<WeaponTemplate>) -> Self {
        Self {
            template: Arc::clone(template),
            firing: false,
            cooldown: 0.0,
        }
    }

    /// Template the weapon was built from
    pub fn template(&self) -> &Arc<WeaponTemplate> {
        &self.template
    }

    /// Hold the trigger
    pub fn start_firing(&mut self) {
        self.firing = true;
    }

    /// Release the trigger
    pub fn stop_firing(&mut self) {
        self.firing = false;
    }

    /// Whether the trigger is held
    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Seconds until the next shot is possible
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Advance the cooldown; while firing, emit one shot whenever it allows
    pub fn tick(&mut self, elapsed: f32, origin: Vec2, friendly: bool, requests: &mut Vec<FireRequest>) {
        self.cooldown = (self.cooldown - elapsed).max(0.0);
        if !self.firing || self.cooldown > 0.0 {
            return;
        }

        requests.extend(self.template.projectiles.iter().map(|projectile| FireRequest {
            projectile: Arc::clone(projectile),
            origin,
            friendly,
        }));
        self.cooldown = self.template.cooldown();
    }
}

//! Projectiles fired by weapons

use std::sync::Arc;

use crate::foundation::math::Vec2;
use crate::templates::ProjectileTemplate;
use crate::types::{Capabilities, Family, FieldDefault, TypeDescriptor};

/// Root projectile kind
pub static PROJECTILE: TypeDescriptor = TypeDescriptor {
    name: "projectile",
    family: Family::Projectile,
    capabilities: Capabilities::COLLIDABLE,
    required_fields: &["imagepath", "speed"],
    defaults: &[("damage", FieldDefault::Number(1.0)), ("lifetime", FieldDefault::Number(0.0))],
    handlers: &[],
};

/// Time window after which a projectile expires on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    /// Time when the projectile was spawned (in seconds)
    pub created_at: f32,
    /// How long it lives (in seconds); zero or less is unlimited
    pub duration: f32,
}

impl Lifetime {
    /// Create a new lifetime window
    pub fn new(created_at: f32, duration: f32) -> Self {
        Self {
            created_at,
            duration,
        }
    }

    /// Check if the window has passed
    pub fn is_expired(&self, now: f32) -> bool {
        if self.duration <= 0.0 {
            false
        } else {
            now >= self.created_at + self.duration
        }
    }

    /// Remaining time in seconds
    pub fn remaining(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.created_at + self.duration - now).max(0.0)
        }
    }
}

/// State of a live projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    template: Arc<ProjectileTemplate>,
    friendly: bool,
    lifetime: Lifetime,
}

impl Projectile {
    /// Projectile spawned at `now`; friendly ones travel up the screen
    pub fn new(template: &Arc<ProjectileTemplate>, friendly: bool, now: f32) -> Self {
        Self {
            template: Arc::clone(template),
            friendly,
            lifetime: Lifetime::new(now, template.lifetime.unwrap_or(0.0)),
        }
    }

    /// Template the projectile was built from
    pub fn template(&self) -> &Arc<ProjectileTemplate> {
        &self.template
    }

    /// Whether it was fired by the player's side
    pub fn is_friendly(&self) -> bool {
        self.friendly
    }

    /// Hit points taken from whatever it hits
    pub fn damage(&self) -> f32 {
        self.template.damage
    }

    /// Expiry window
    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// Constant travel velocity
    pub fn velocity(&self) -> Vec2 {
        let heading = if self.friendly { -1.0 } else { 1.0 };
        Vec2::new(0.0, heading * self.template.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt(lifetime: Option<f32>) -> Arc<ProjectileTemplate> {
        Arc::new(ProjectileTemplate {
            key: "bolt".to_string(),
            kind: &PROJECTILE,
            imagepath: "bolt.png".to_string(),
            speed: 300.0,
            damage: 5.0,
            lifetime,
        })
    }

    #[test]
    fn test_heading_follows_side() {
        let template = bolt(None);
        assert_eq!(Projectile::new(&template, true, 0.0).velocity(), Vec2::new(0.0, -300.0));
        assert_eq!(Projectile::new(&template, false, 0.0).velocity(), Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_lifetime_window() {
        let shot = Projectile::new(&bolt(Some(2.0)), true, 10.0);
        assert!(!shot.lifetime().is_expired(11.0));
        assert!(shot.lifetime().is_expired(12.0));
        assert_eq!(shot.lifetime().remaining(11.5), 0.5);
    }

    #[test]
    fn test_unlimited_lifetime() {
        let shot = Projectile::new(&bolt(None), false, 0.0);
        assert!(!shot.lifetime().is_expired(1000.0));
        assert_eq!(shot.lifetime().remaining(1000.0), f32::INFINITY);
    }
}

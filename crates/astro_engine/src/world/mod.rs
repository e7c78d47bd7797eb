//! The world: entity storage, named groups and the per-frame pipeline
//!
//! One frame is `update` (groups in [`Group::UPDATE_ORDER`], then the shots
//! requested during the update are spawned), `check_collisions` over
//! [`COLLIDABLE_PAIRS`] against the updated positions, and `purge` of every
//! removed entity. [`World::step`] runs the three in order.

pub mod groups;

pub use groups::{Group, COLLIDABLE_PAIRS};

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::assets::{AssetError, AssetLoader, ImageData};
use crate::config::WorldConfig;
use crate::entity::{Entity, EntityState, FireRequest};
use crate::foundation::collections::{EntityId, EntityMap};
use crate::foundation::math::Vec2;
use crate::foundation::time::Tick;
use crate::physics::{CollisionResolver, UnhandledCollisionError};
use crate::templates::ShipTemplate;
use crate::types::{Capabilities, TypeRegistry};

/// World errors
#[derive(Error, Debug)]
pub enum WorldError {
    /// Only placed entities can join the world
    #[error("cannot add a {0} that has not been placed")]
    NotPlaced(String),

    /// The template's kind cannot be flown by the player
    #[error("`{key}` is a {kind} template, not a player-controlled ship")]
    NotPlayerShip {
        /// Template key
        key: String,
        /// Kind of the template
        kind: String,
    },

    /// Sprite loading failed while placing an entity
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Two colliding entities have no rule
    #[error(transparent)]
    Collision(#[from] UnhandledCollisionError),
}

/// What happened during one [`World::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Projectiles spawned by weapons
    pub fired: usize,
    /// Collisions resolved
    pub collisions: usize,
    /// Entities purged
    pub removed: usize,
}

/// Owns every live entity and the groups they belong to
pub struct World {
    config: WorldConfig,
    entities: EntityMap<Entity>,
    groups: BTreeMap<Group, Vec<EntityId>>,
    assets: Box<dyn AssetLoader>,
    resolver: CollisionResolver,
    now: f32,
}

impl World {
    /// Create an empty world
    pub fn init(config: WorldConfig, types: Arc<TypeRegistry>, assets: Box<dyn AssetLoader>) -> Self {
        log::info!(
            "World initialized: {}x{} screen, off-screen cutoff {}",
            config.screen_width,
            config.screen_height,
            config.off_screen_cutoff
        );
        Self {
            config,
            entities: EntityMap::with_key(),
            groups: Group::UPDATE_ORDER.iter().map(|&group| (group, Vec::new())).collect(),
            assets,
            resolver: CollisionResolver::new(types),
            now: 0.0,
        }
    }

    /// Drop every entity; returns how many were dropped
    pub fn teardown(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.clear();
        self.groups.values_mut().for_each(Vec::clear);
        log::info!("World torn down, {} entities dropped", count);
        count
    }

    /// Screen and bounds settings
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Image source used when placing entities
    pub fn assets(&self) -> &dyn AssetLoader {
        self.assets.as_ref()
    }

    /// Time of the last frame
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Add a placed entity to the world and its group
    pub fn add(&mut self, entity: Entity) -> Result<EntityId, WorldError> {
        if !entity.is_alive() {
            return Err(WorldError::NotPlaced(entity.kind().name.to_string()));
        }
        let group = entity.group();
        let id = self.entities.insert(entity);
        self.groups.entry(group).or_default().push(id);
        Ok(id)
    }

    /// Place an entity and add it
    pub fn spawn(&mut self, mut entity: Entity, position: Vec2, velocity: Vec2) -> Result<EntityId, WorldError> {
        entity.place(position, velocity, self.assets.as_ref())?;
        self.add(entity)
    }

    /// Spawn a ship at rest at the player's starting point, mid-screen at
    /// three quarters height. Only controllable friendly kinds qualify.
    pub fn spawn_player_ship(&mut self, template: &Arc<ShipTemplate>) -> Result<EntityId, WorldError> {
        if !template.kind.has(Capabilities::CONTROLLABLE | Capabilities::FRIENDLY) {
            return Err(WorldError::NotPlayerShip {
                key: template.key.clone(),
                kind: template.kind.name.to_string(),
            });
        }
        let start = Vec2::new(self.config.screen_width / 2.0, 3.0 * self.config.screen_height / 4.0);
        let id = self.spawn(Entity::ship(template), start, Vec2::zeros())?;
        log::info!("Player ship {} spawned", template.key);
        Ok(id)
    }

    /// Entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable entity by id
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Whether the entity is still in the world and alive
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_alive)
    }

    /// Ids in a group, in insertion order
    pub fn members(&self, group: Group) -> &[EntityId] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every stored entity
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Number of stored entities, removed ones included until purged
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is stored
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Tick every group in update order, then spawn the shots fired
    /// during the update. Returns the number of shots.
    pub fn update(&mut self, tick: Tick) -> Result<usize, WorldError> {
        self.now = tick.now;
        let mut fired = Vec::new();

        for group in Group::UPDATE_ORDER {
            let Some(members) = self.groups.get(&group) else {
                continue;
            };
            for &id in members {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.tick(tick, &self.config, &mut fired);
                }
            }
        }

        let count = fired.len();
        for request in fired {
            self.fire(request, tick.now)?;
        }
        Ok(count)
    }

    fn fire(&mut self, request: FireRequest, now: f32) -> Result<EntityId, WorldError> {
        let shot = Entity::projectile(&request.projectile, request.friendly, now);
        let velocity = shot.default_velocity();
        self.spawn(shot, request.origin, velocity)
    }

    /// For every live collidable entity of `a`, the live collidable entities
    /// of `b` whose boxes overlap it. Entities without overlaps are left out.
    pub fn overlaps(&self, a: Group, b: Group) -> Vec<(EntityId, Vec<EntityId>)> {
        let collidable = |id: &EntityId| {
            self.entities
                .get(*id)
                .filter(|entity| entity.is_alive() && entity.kind().has(Capabilities::COLLIDABLE))
                .map(|entity| (*id, entity.rect()))
        };
        let others: Vec<_> = self.members(b).iter().filter_map(collidable).collect();

        self.members(a)
            .iter()
            .filter_map(collidable)
            .filter_map(|(id, rect)| {
                let hits: Vec<EntityId> = others
                    .iter()
                    .filter(|(other, other_rect)| *other != id && rect.intersects(other_rect))
                    .map(|(other, _)| *other)
                    .collect();
                (!hits.is_empty()).then_some((id, hits))
            })
            .collect()
    }

    /// Resolve every overlapping pair of the collidable groups. An entity
    /// removed by one collision takes part in no further collision this
    /// frame. Returns the number of collisions resolved.
    pub fn check_collisions(&mut self) -> Result<usize, WorldError> {
        let mut resolved = 0;

        for (group_a, group_b) in COLLIDABLE_PAIRS {
            for (id, colliders) in self.overlaps(group_a, group_b) {
                for other in colliders {
                    let Some([a, b]) = self.entities.get_disjoint_mut([id, other]) else {
                        continue;
                    };
                    if !a.is_alive() || !b.is_alive() {
                        continue;
                    }
                    self.resolver.resolve(a, b)?;
                    resolved += 1;
                }
            }
        }
        Ok(resolved)
    }

    /// Drop removed entities from storage and groups; returns how many
    pub fn purge(&mut self) -> usize {
        let before = self.entities.len();
        self.entities
            .retain(|_, entity| entity.state() != EntityState::Removed);

        let entities = &self.entities;
        for members in self.groups.values_mut() {
            members.retain(|id| entities.contains_key(*id));
        }
        before - self.entities.len()
    }

    /// Run one whole frame
    pub fn step(&mut self, tick: Tick) -> Result<FrameReport, WorldError> {
        let fired = self.update(tick)?;
        let collisions = self.check_collisions()?;
        let removed = self.purge();
        Ok(FrameReport {
            fired,
            collisions,
            removed,
        })
    }

    /// Draw every live entity onto `frame`, groups in update order
    pub fn draw(&self, frame: &mut ImageData) {
        for group in Group::UPDATE_ORDER {
            for &id in self.members(group) {
                let Some(entity) = self.entities.get(id).filter(|entity| entity.is_alive()) else {
                    continue;
                };
                if let Some(sprite) = entity.sprite() {
                    let rect = entity.rect();
                    frame.blit(sprite.image(), rect.left().round() as i64, rect.top().round() as i64);
                }
            }
        }
    }
}

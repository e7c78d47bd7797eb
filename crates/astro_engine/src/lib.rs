//! # Astro Engine
//!
//! Core of a small data-driven 2D arcade shooter.
//!
//! ## Features
//!
//! - **Declarative templates**: ships, weapons and projectiles defined in TOML or RON
//! - **Kind registry**: static descriptors with capabilities and collision handlers
//! - **Double dispatch**: collision rules defined once per pair of kinds
//! - **Kinematics**: bounded acceleration towards the input direction with a speed cap
//! - **Headless world**: named groups, overlap queries and software drawing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use astro_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let types = Arc::new(TypeRegistry::builtin()?);
//!     let mut templates = TemplateRegistry::new(Arc::clone(&types));
//!     templates.load_all("config", &DEFAULT_LOAD_ORDER)?;
//!
//!     let assets = FileAssetLoader::new("assets");
//!     let mut world = World::init(WorldConfig::default(), types, Box::new(assets));
//!     if let Some(ship) = templates.ship("fighter") {
//!         world.spawn_player_ship(&ship)?;
//!     }
//!
//!     let mut clock = FrameClock::new();
//!     for frame in 0..60 {
//!         if let Some(tick) = clock.sample(frame as f32 / 60.0) {
//!             world.step(tick)?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod entity;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod templates;
pub mod types;
pub mod world;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, AssetLoader, FileAssetLoader, ImageData, MemoryAssetLoader},
        config::{Config, ConfigError, Format, WorldConfig},
        entity::{Entity, EntityState, Ship},
        foundation::{
            collections::EntityId,
            math::{Rect, Vec2},
            time::{FixedStep, FrameClock, Tick},
        },
        input::{Command, InputEvent, InputManager, KeyBindings, KeyCode},
        physics::{CollisionResolver, KinematicController, UnhandledCollisionError},
        templates::{
            ProjectileTemplate, ShipTemplate, Template, TemplateError, TemplateRegistry,
            WeaponTemplate, DEFAULT_LOAD_ORDER,
        },
        types::{Capabilities, TypeDescriptor, TypeRegistry},
        world::{FrameReport, Group, World, WorldError},
    };
}

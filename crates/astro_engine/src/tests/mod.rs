//! Engine-level scenarios spanning templates, entities and the world


use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::{ImageData, MemoryAssetLoader};
use crate::config::WorldConfig;
use crate::templates::{TemplateRegistry, DEFAULT_LOAD_ORDER};
use crate::types::TypeRegistry;
use crate::world::World;

pub(crate) const SHIP_COLOR: [u8; 4] = [40, 90, 220, 255];

/// Directory holding the checked-in template fixtures
pub(crate) fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/templates")
}

/// Sprites referenced by the fixtures
pub(crate) fn fixture_assets() -> MemoryAssetLoader {
    MemoryAssetLoader::new()
        .with_image("ship.png", ImageData::solid_color(20, 20, SHIP_COLOR))
        .with_image("glow.png", ImageData::solid_color(20, 4, [255, 140, 0, 255]))
        .with_image("bolt.png", ImageData::solid_color(2, 6, [250, 230, 60, 255]))
}

/// Builtin kinds plus every fixture template
pub(crate) fn loaded_templates() -> TemplateRegistry {
    let mut templates = TemplateRegistry::new(Arc::new(TypeRegistry::builtin().unwrap()));
    templates.load_all(fixture_dir(), &DEFAULT_LOAD_ORDER).unwrap();
    templates
}

/// Empty world sharing the templates' kind registry
pub(crate) fn fixture_world(templates: &TemplateRegistry) -> World {
    World::init(
        WorldConfig::default(),
        Arc::clone(templates.types()),
        Box::new(fixture_assets()),
    )
}

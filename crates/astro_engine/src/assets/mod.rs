//! Asset loading
//!
//! The engine only needs images. Loaders hand out shared handles so that
//! every projectile of one kind reuses the same decoded sprite.

pub mod image_loader;

pub use image_loader::ImageData;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Shared handle to a decoded image
pub type ImageHandle = Arc<ImageData>;

/// Source of sprite images
pub trait AssetLoader {
    /// Load the image at `path`, relative to the loader's roots
    fn load_image(&self, path: &str) -> Result<ImageHandle, AssetError>;
}

/// Loads images from disk, caching every decoded file
pub struct FileAssetLoader {
    search_paths: Vec<PathBuf>,
    cache: RefCell<HashMap<String, ImageHandle>>,
}

impl FileAssetLoader {
    /// Create a loader resolving paths against one root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_search_paths(vec![root.into()])
    }

    /// Create a loader trying each search path in order
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of decoded images held in the cache
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
    }
}

impl AssetLoader for FileAssetLoader {
    fn load_image(&self, path: &str) -> Result<ImageHandle, AssetError> {
        if let Some(image) = self.cache.borrow().get(path) {
            return Ok(Arc::clone(image));
        }

        let full_path = self
            .resolve(path)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        let image = Arc::new(ImageData::from_file(&full_path)?);

        self.cache
            .borrow_mut()
            .insert(path.to_string(), Arc::clone(&image));
        Ok(image)
    }
}

/// In-memory image table, for tests and procedurally built sprites
#[derive(Default)]
pub struct MemoryAssetLoader {
    images: HashMap<String, ImageHandle>,
}

impl MemoryAssetLoader {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under a path (builder pattern)
    pub fn with_image(mut self, path: impl Into<String>, image: ImageData) -> Self {
        self.insert(path, image);
        self
    }

    /// Register an image under a path
    pub fn insert(&mut self, path: impl Into<String>, image: ImageData) {
        self.images.insert(path.into(), Arc::new(image));
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_image(&self, path: &str) -> Result<ImageHandle, AssetError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),
}

//! Entity visuals

use std::sync::Arc;

use crate::assets::{AssetError, AssetLoader, ImageHandle};

/// Static image plus an optional "moving" variant shown while the entity
/// accelerates
#[derive(Debug, Clone)]
pub struct Sprite {
    static_image: ImageHandle,
    moving_image: Option<ImageHandle>,
    moving: bool,
}

impl Sprite {
    /// Load a sprite. Inverted sprites are flipped vertically; the overlay,
    /// if any, is composited onto the top-left corner of the base image.
    pub fn load(
        assets: &dyn AssetLoader,
        imagepath: &str,
        overlay: Option<&str>,
        inverted: bool,
    ) -> Result<Self, AssetError> {
        let load = |path: &str| -> Result<ImageHandle, AssetError> {
            let image = assets.load_image(path)?;
            Ok(if inverted {
                Arc::new(image.flipped_vertically())
            } else {
                image
            })
        };

        let static_image = load(imagepath)?;
        let moving_image = overlay
            .map(|path| load(path).map(|glow| Arc::new(static_image.composited(&glow, 0, 0))))
            .transpose()?;

        Ok(Self {
            static_image,
            moving_image,
            moving: false,
        })
    }

    /// Image to draw right now
    pub fn image(&self) -> &ImageHandle {
        match (&self.moving_image, self.moving) {
            (Some(moving), true) => moving,
            _ => &self.static_image,
        }
    }

    /// Switch between the static and moving images
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    /// Whether the moving image is shown
    pub fn is_moving(&self) -> bool {
        self.moving && self.moving_image.is_some()
    }

    /// Width and height in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.static_image.width(), self.static_image.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, MemoryAssetLoader};

    #[test]
    fn test_moving_image_composites_overlay() {
        let assets = MemoryAssetLoader::new()
            .with_image("ship.png", ImageData::solid_color(4, 4, [0, 0, 255, 255]))
            .with_image("glow.png", ImageData::solid_color(2, 2, [255, 0, 0, 255]));

        let mut sprite = Sprite::load(&assets, "ship.png", Some("glow.png"), false).unwrap();
        assert_eq!(sprite.image().pixel(0, 0), Some([0, 0, 255, 255]));

        sprite.set_moving(true);
        assert!(sprite.is_moving());
        assert_eq!(sprite.image().pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(sprite.image().pixel(3, 3), Some([0, 0, 255, 255]));
        assert_eq!(sprite.size(), (4, 4));
    }

    #[test]
    fn test_inverted_sprite_is_flipped() {
        let mut image = ImageData::solid_color(1, 2, [0, 0, 0, 255]);
        image.blit(&ImageData::solid_color(1, 1, [9, 9, 9, 255]), 0, 0);
        let assets = MemoryAssetLoader::new().with_image("bolt.png", image);

        let sprite = Sprite::load(&assets, "bolt.png", None, true).unwrap();
        assert_eq!(sprite.image().pixel(0, 1), Some([9, 9, 9, 255]));

        let mut still = sprite.clone();
        still.set_moving(true);
        assert!(!still.is_moving());
    }

    #[test]
    fn test_missing_overlay_is_an_error() {
        let assets = MemoryAssetLoader::new().with_image("ship.png", ImageData::solid_color(1, 1, [0; 4]));
        assert!(Sprite::load(&assets, "ship.png", Some("glow.png"), false).is_err());
    }
}

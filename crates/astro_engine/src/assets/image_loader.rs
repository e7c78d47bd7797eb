//! Image loading utilities for sprite data
//!
//! Provides PNG loading plus the small amount of software compositing the
//! engine needs: vertical flips for inverted sprites, overlays for the engine
//! glow and blitting sprites onto a frame.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};

use crate::assets::AssetError;

/// Loaded RGBA image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pixels: RgbaImage,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {}: {}", path_ref.display(), e)))?;
        let pixels = img.to_rgba8();

        log::debug!("Loaded image {}x{} from {:?}", pixels.width(), pixels.height(), path_ref);

        Ok(Self { pixels })
    }

    /// Create a solid color image (useful for testing, placeholders and
    /// clearing frames)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Color of one pixel, if it lies inside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.pixels.get_pixel(x, y).0)
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.pixels.as_raw().len()
    }

    /// Copy of this image mirrored top to bottom
    pub fn flipped_vertically(&self) -> Self {
        Self {
            pixels: imageops::flip_vertical(&self.pixels),
        }
    }

    /// Copy of this image with `overlay` alpha-blended on top at an offset
    pub fn composited(&self, overlay: &ImageData, x: i64, y: i64) -> Self {
        let mut result = self.clone();
        result.blit(overlay, x, y);
        result
    }

    /// Alpha-blend `source` onto this image with its top-left corner at
    /// `(x, y)`; parts falling outside are clipped
    pub fn blit(&mut self, source: &ImageData, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, &source.pixels, x, y);
    }

    /// Write the image as PNG
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AssetError> {
        let path_ref = path.as_ref();
        self.pixels
            .save(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to save image {}: {}", path_ref.display(), e)))?;
        log::info!("Saved {}x{} image to {:?}", self.width(), self.height(), path_ref);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 4, RED);
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert_eq!(img.pixel(0, 0), Some(RED));
        assert_eq!(img.pixel(4, 0), None);
    }

    #[test]
    fn test_flip_vertical() {
        let mut img = ImageData::solid_color(2, 2, RED);
        img.blit(&ImageData::solid_color(2, 1, BLUE), 0, 0);

        let flipped = img.flipped_vertically();
        assert_eq!(flipped.pixel(0, 0), Some(RED));
        assert_eq!(flipped.pixel(0, 1), Some(BLUE));
    }

    #[test]
    fn test_composite_at_offset_clips() {
        let base = ImageData::solid_color(4, 4, RED);
        let glow = ImageData::solid_color(2, 2, BLUE);

        let combined = base.composited(&glow, 3, 3);
        assert_eq!(combined.pixel(3, 3), Some(BLUE));
        assert_eq!(combined.pixel(2, 2), Some(RED));
        // The original is untouched
        assert_eq!(base.pixel(3, 3), Some(RED));
    }

    #[test]
    fn test_png_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprite.png");

        ImageData::solid_color(3, 5, BLUE).save(&path).unwrap();
        let loaded = ImageData::from_file(&path).unwrap();
        assert_eq!(loaded.width(), 3);
        assert_eq!(loaded.height(), 5);
        assert_eq!(loaded.pixel(1, 1), Some(BLUE));
    }
}

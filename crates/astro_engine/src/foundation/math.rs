//! Math utilities and types
//!
//! Screen space is 2D with the origin in the top-left corner and `y` growing
//! downwards, matching the way sprites are laid out on the play area.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle described by its center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Center of the rectangle
    pub center: Vec2,

    /// Half of the width and half of the height
    pub half_extents: Vec2,
}

impl Rect {
    /// Create a rectangle from its center and half extents
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    /// Create a rectangle from its center and full size
    pub fn from_size(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center, Vec2::new(width * 0.5, height * 0.5))
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.center.x - self.half_extents.x
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.center.x + self.half_extents.x
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.center.y - self.half_extents.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Check whether two rectangles overlap.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Check that both components of a vector are finite
pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

//! Filled axis-aligned rectangle

use crate::error::{CollisionError, CollisionResult};
use crate::foundation::math::{Rect, Vec2};

/// Sampling step used when a box drives a pixel scan and none was given
pub const DEFAULT_FILLED_INCREMENT: f32 = 1.0;

/// Filled axis-aligned rectangle in world space
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCollisionRect {
    rect: Rect,
    increment: Vec2,
}

impl BoxCollisionRect {
    /// Create a box collision shape
    ///
    /// Negative or non-finite sizes are a caller bug and are rejected. A zero
    /// width or height is accepted; such a box never collides.
    pub fn new(rect: Rect) -> CollisionResult<Self> {
        if !rect.is_finite() {
            return Err(CollisionError::InvalidGeometry(format!("non-finite box {rect:?}")));
        }
        if rect.width < 0.0 || rect.height < 0.0 {
            return Err(CollisionError::InvalidGeometry(format!("negative box size {rect:?}")));
        }
        Ok(Self {
            rect,
            increment: Vec2::new(DEFAULT_FILLED_INCREMENT, DEFAULT_FILLED_INCREMENT),
        })
    }

    /// Override the preferred sampling increment (builder pattern)
    pub fn with_increment(mut self, increment: Vec2) -> CollisionResult<Self> {
        if !(increment.x > 0.0 && increment.y > 0.0) {
            return Err(CollisionError::InvalidGeometry(format!("increment must be positive, got {increment:?}")));
        }
        self.increment = increment;
        Ok(self)
    }

    /// The rectangle
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Bounding rect (the rectangle itself)
    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    /// Sampling step for pixel scans driven by this box
    pub fn preferred_increment(&self) -> Vec2 {
        self.increment
    }

    /// Half-open point containment
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.rect.contains_point(point)
    }

    /// True when the box covers no area
    pub fn is_degenerate(&self) -> bool {
        self.rect.is_empty()
    }

    /// Corners, clockwise from the top-left
    pub fn vertices(&self) -> [Vec2; 4] {
        self.rect.corners()
    }

    /// Interval overlap against another box
    pub fn overlaps(&self, other: &BoxCollisionRect) -> bool {
        self.rect.intersects(&other.rect)
    }

    pub(crate) fn shift(&mut self, offset: Vec2) {
        self.rect = self.rect.translated(offset);
    }
}

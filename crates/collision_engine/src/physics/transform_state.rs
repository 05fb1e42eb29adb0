//! Position and rotation snapshot of a collidable

use crate::foundation::math::Vec2;

/// Immutable (position, rotation) snapshot
///
/// The collision manager captures one per collidable at the start of every
/// pass and compares it with the previous one to decide whether the body
/// moved and whether its collision rects must be shifted or rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    position: Vec2,
    rotation: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(Vec2::zeros(), 0.0)
    }
}

impl TransformState {
    /// Create a snapshot; `rotation` is in degrees
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Snapshot with no rotation
    pub fn from_position(position: Vec2) -> Self {
        Self::new(position, 0.0)
    }

    /// Position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Movement from `previous` to this snapshot
    pub fn displacement_from(&self, previous: &TransformState) -> Vec2 {
        self.position - previous.position
    }

    /// True if the position differs from `previous`
    pub fn has_moved_from(&self, previous: &TransformState) -> bool {
        self.position != previous.position
    }

    /// True if the rotation differs from `previous`
    pub fn has_rotated_from(&self, previous: &TransformState) -> bool {
        self.rotation != previous.rotation
    }
}

//! Shape recording for collision visualization
//!
//! Nothing here feeds back into detection. A renderer consumes the recorded
//! shapes through [`DebugDrawSystem::shapes`].

use crate::foundation::math::{Rect, Vec2, Vec4};
use std::collections::HashMap;

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Sink that collision rects draw themselves into
pub trait DrawContext {
    /// Outline or fill an axis-aligned rect
    fn draw_rect(&mut self, rect: Rect, color: Vec4, filled: bool);

    /// Outline a closed polygon
    fn draw_polygon(&mut self, vertices: &[Vec2], color: Vec4);

    /// Mark a single point
    fn draw_point(&mut self, position: Vec2, color: Vec4, size: f32);
}

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Axis-aligned rect
    Rect {
        /// Rect in world space
        rect: Rect,
        /// RGBA color
        color: Vec4,
        /// Seconds left before the shape expires
        duration: f32,
        /// Fill instead of outline
        filled: bool,
    },

    /// Closed polygon outline
    Polygon {
        /// Vertices in world space
        vertices: Vec<Vec2>,
        /// RGBA color
        color: Vec4,
        /// Seconds left before the shape expires
        duration: f32,
    },

    /// Point at position
    Point {
        /// Position in world space
        position: Vec2,
        /// RGBA color
        color: Vec4,
        /// Point size in pixels
        size: f32,
        /// Seconds left before the shape expires
        duration: f32,
    },
}

impl DebugShape {
    /// Age the shape; true once it has expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::Rect { duration, .. }
            | DebugShape::Polygon { duration, .. }
            | DebugShape::Point { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Shape store with frame-limited and keyed entries
///
/// Keyed shapes stay until removed or replaced; everything else ages out in
/// [`DebugDrawSystem::update`].
pub struct DebugDrawSystem {
    temporary_shapes: Vec<DebugShape>,
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Duration given to shapes drawn through [`DrawContext`]
    pub default_duration: f32,

    /// When false, draw calls are dropped
    pub enabled: bool,
}

impl DebugDrawSystem {
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            default_duration: 0.0,
            enabled: true,
        }
    }

    /// Record a temporary shape
    pub fn draw(&mut self, shape: DebugShape) {
        if self.enabled {
            self.temporary_shapes.push(shape);
        }
    }

    /// Record or replace a persistent shape
    pub fn draw_persistent(&mut self, id: impl Into<DebugShapeId>, shape: DebugShape) {
        if self.enabled {
            self.persistent_shapes.insert(id.into(), shape);
        }
    }

    /// Remove a persistent shape
    pub fn remove_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Age temporary shapes and drop the expired ones
    ///
    /// Shapes with a zero duration live for exactly one frame.
    pub fn update(&mut self, delta_time: f32) {
        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Drop every shape
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }

    /// All shapes to render this frame
    pub fn shapes(&self) -> impl Iterator<Item = &DebugShape> {
        self.temporary_shapes.iter().chain(self.persistent_shapes.values())
    }

    /// Number of shapes to render this frame
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawContext for DebugDrawSystem {
    fn draw_rect(&mut self, rect: Rect, color: Vec4, filled: bool) {
        let duration = self.default_duration;
        self.draw(DebugShape::Rect { rect, color, duration, filled });
    }

    fn draw_polygon(&mut self, vertices: &[Vec2], color: Vec4) {
        let duration = self.default_duration;
        self.draw(DebugShape::Polygon { vertices: vertices.to_vec(), color, duration });
    }

    fn draw_point(&mut self, position: Vec2, color: Vec4, size: f32) {
        let duration = self.default_duration;
        self.draw(DebugShape::Point { position, color, size, duration });
    }
}

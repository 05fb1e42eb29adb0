//! Per-body collision rect overlay
//!
//! Each pass redraws every body's rects, colored by whether the body is
//! colliding, sleeping or neither, plus optional broad-phase bounds (GEA 10.2).

use crate::debug::draw::{DebugDrawSystem, DebugShape};
use crate::foundation::collections::CollidableKey;
use crate::foundation::math::Vec4;
use crate::physics::collidable::Collidable;
use crate::physics::collision_side::CollisionSide;

/// Colors per body state
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Color for body bounding rects
    pub broad_phase: Vec4,

    /// Color for collision rects (not colliding)
    pub shape_default: Vec4,

    /// Color for collision rects (currently colliding)
    pub shape_colliding: Vec4,

    /// Color for sleeping bodies
    pub sleeping: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            broad_phase: Vec4::new(0.5, 0.8, 1.0, 0.15),   // Light blue, transparent
            shape_default: Vec4::new(0.0, 1.0, 0.0, 0.3),  // Green, semi-transparent
            shape_colliding: Vec4::new(1.0, 0.0, 0.0, 0.5), // Red, semi-transparent
            sleeping: Vec4::new(0.5, 0.5, 0.5, 0.3),        // Grey
        }
    }
}

/// Turns collidables into debug shapes
///
/// Bounding rects are persistent shapes keyed by body and removed with it.
/// Collision rects are redrawn every update in the color of the body's state.
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,

    /// Show body bounding rects
    pub show_broad_phase: bool,

    /// Show collision rects
    pub show_shapes: bool,
}

impl CollisionDebugVisualizer {
    /// Visualizer drawing collision rects only
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            show_broad_phase: false,
            show_shapes: true,
        }
    }

    /// Replace the color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Draw a body's bounding rect as a persistent shape keyed by the body
    pub fn draw_broad_phase(&mut self, key: CollidableKey, body: &dyn Collidable) {
        if !self.show_broad_phase {
            return;
        }
        let id = broad_phase_id(key);
        match body.bounding_rect() {
            Some(rect) => self.debug_draw.draw_persistent(id, DebugShape::Rect {
                rect,
                color: self.colors.broad_phase,
                duration: f32::INFINITY,
                filled: true,
            }),
            None => self.debug_draw.remove_persistent(&id),
        }
    }

    /// Draw every rect of a body for one frame
    pub fn draw_collidable(&mut self, body: &dyn Collidable) {
        if !self.show_shapes {
            return;
        }
        let state = body.collidable_state();
        let colliding = CollisionSide::ALL.iter().any(|&side| state.collided_count_on_side(side) > 0);
        let color = if !state.is_awake() {
            self.colors.sleeping
        } else if colliding {
            self.colors.shape_colliding
        } else {
            self.colors.shape_default
        };
        for rect in state.collision_rects() {
            rect.draw(&mut self.debug_draw, color);
        }
    }

    /// Clear broad-phase visualization for a body
    pub fn clear_broad_phase(&mut self, key: CollidableKey) {
        self.debug_draw.remove_persistent(&broad_phase_id(key));
    }

    /// Drop every shape, persistent ones included
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Expire last frame's rects
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Shapes to hand to a renderer this frame
    pub fn shapes(&self) -> impl Iterator<Item = &DebugShape> {
        self.debug_draw.shapes()
    }

    /// Underlying shape store
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

fn broad_phase_id(key: CollidableKey) -> String {
    format!("broad_phase_{key:?}")
}

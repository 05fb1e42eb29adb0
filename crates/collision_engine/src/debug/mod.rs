//! Collision visualization (GEA 10.2)
//!
//! Records shapes only; drawing them is left to the host renderer.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugShape, DebugDrawSystem, DebugShapeId, DrawContext};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};

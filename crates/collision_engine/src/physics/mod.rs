//! Physics module for 2D collision detection and contact notification
//!
//! Bodies implement [`Collidable`] and are registered with a
//! [`CollisionManager`], which runs broad phase, narrow phase and the
//! NEW / UPDATED / FINISHED lifecycle once per frame. Physical response is
//! left to the listeners.

pub mod collidable;
pub mod collision;
pub mod collision_layers;
pub mod collision_manager;
pub mod collision_pair;
pub mod collision_side;
pub mod transform_state;

#[cfg(test)]
mod tests;

pub use collidable::{Collidable, CollidableState, CollidedEntry};
pub use collision::{
    BoxCollisionRect,
    CollisionRect,
    PixelCollisionRect,
    PixelIterator,
    PixelMask,
    PolygonCollisionRect,
    RectShape,
    TexelRegion,
};
pub use collision_layers::CollisionLayers;
pub use collision_manager::{classify_side, get_collision_side, CollisionManager, ResponseFilter};
pub use collision_pair::{CollisionPair, PairKey, RectTagPair};
pub use collision_side::CollisionSide;
pub use transform_state::TransformState;

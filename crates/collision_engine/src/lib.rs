//! # Collision Engine
//!
//! 2D collision detection and contact notification for game objects.
//!
//! ## Features
//!
//! - **Shapes**: filled boxes and polygons, alpha-mask pixel regions
//! - **Lifecycle**: NEW / UPDATED / FINISHED per side and per contact
//! - **Deferred Dispatch**: listeners run only after detection completes
//! - **Handles**: bodies and listeners live in arenas, removal purges synchronously
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::any::Any;
//! use collision_engine::prelude::*;
//!
//! struct Crate {
//!     state: CollidableState,
//!     position: Vec2,
//! }
//!
//! impl Collidable for Crate {
//!     fn collidable_state(&self) -> &CollidableState { &self.state }
//!     fn collidable_state_mut(&mut self) -> &mut CollidableState { &mut self.state }
//!     fn transform_state(&self) -> TransformState { TransformState::from_position(self.position) }
//!
//!     fn create_collision_rects(&self) -> CollisionResult<Vec<CollisionRect>> {
//!         let p = self.position;
//!         Ok(vec![CollisionRect::new_box("body", Rect::new(p.x, p.y, 16.0, 16.0))?])
//!     }
//!
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! struct Logger;
//!
//! impl CollisionEventListener for Logger {
//!     fn on_collision(&mut self, event: &CollisionEvent, _context: &mut ListenerContext<'_>) {
//!         println!("hit on {}", event.side());
//!     }
//! }
//!
//! fn main() -> Result<(), CollisionError> {
//!     let mut manager = CollisionManager::new();
//!     let a = manager.add_collidable(Crate { state: CollidableState::new(), position: Vec2::new(0.0, 0.0) });
//!     manager.add_collidable(Crate { state: CollidableState::new(), position: Vec2::new(8.0, 0.0) });
//!     manager.add_collision_listener(a, Box::new(Logger))?;
//!
//!     let mut app = AppData::new();
//!     app.advance(1.0 / 60.0);
//!     manager.update(&app);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod physics;
pub mod events;
pub mod debug;

pub use error::{CollisionError, CollisionResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        CollisionError, CollisionResult,
        config::{Config, CollisionConfig},
        foundation::{
            collections::{CollidableKey, ListenerKey, ManagerListenerKey},
            math::{Rect, Vec2},
            time::AppData,
        },
        physics::{
            Collidable, CollidableState, CollisionLayers, CollisionManager, CollisionPair,
            CollisionRect, CollisionSide, PixelCollisionRect, PixelMask, TransformState,
        },
        events::{
            CollisionEvent, CollisionEventListener, CollisionManagerEventListener,
            ContactEvent, ContactEventListener, EventState, ListenerContext, UpdateData,
        },
    };
}

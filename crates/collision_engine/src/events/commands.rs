//! What listeners can touch while the batch is being flushed
//!
//! Listeners get direct access to the bodies' own state but may not change
//! the set of bodies or listeners mid-flush. Such changes go through
//! [`CollisionCommands`] and are applied once the flush is over, so they only
//! show up in the next pass.

use crate::foundation::collections::{CollidableKey, HandleMap, ListenerKey};
use crate::foundation::time::AppData;
use crate::physics::collidable::Collidable;
use super::{CollisionEventListener, ContactEventListener};

/// A structural change deferred until after the flush
pub enum CollisionCommand {
    /// Register a new body
    AddCollidable(Box<dyn Collidable>),
    /// Unregister a body
    RemoveCollidable(CollidableKey),
    /// Attach a collision listener to a body
    AddCollisionListener(CollidableKey, Box<dyn CollisionEventListener>),
    /// Attach a contact listener to a body
    AddContactListener(CollidableKey, Box<dyn ContactEventListener>),
    /// Detach a listener
    RemoveListener(ListenerKey),
    /// Skip a rect pair in the next pass
    IgnoreCollision {
        /// Body owning `tag_a`
        a: CollidableKey,
        /// Body owning `tag_b`
        b: CollidableKey,
        /// Rect tag on `a`
        tag_a: String,
        /// Rect tag on `b`
        tag_b: String,
    },
}

impl std::fmt::Debug for CollisionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionCommand::AddCollidable(_) => f.write_str("AddCollidable"),
            CollisionCommand::RemoveCollidable(key) => write!(f, "RemoveCollidable({key:?})"),
            CollisionCommand::AddCollisionListener(key, _) => write!(f, "AddCollisionListener({key:?})"),
            CollisionCommand::AddContactListener(key, _) => write!(f, "AddContactListener({key:?})"),
            CollisionCommand::RemoveListener(key) => write!(f, "RemoveListener({key:?})"),
            CollisionCommand::IgnoreCollision { a, b, tag_a, tag_b } => {
                write!(f, "IgnoreCollision({a:?}:{tag_a}, {b:?}:{tag_b})")
            }
        }
    }
}

/// Queue of deferred structural changes
#[derive(Debug, Default)]
pub struct CollisionCommands {
    queue: Vec<CollisionCommand>,
}

impl CollisionCommands {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body after the flush
    pub fn add_collidable(&mut self, body: Box<dyn Collidable>) {
        self.queue.push(CollisionCommand::AddCollidable(body));
    }

    /// Unregister a body after the flush
    pub fn remove_collidable(&mut self, key: CollidableKey) {
        self.queue.push(CollisionCommand::RemoveCollidable(key));
    }

    /// Attach a collision listener after the flush
    pub fn add_collision_listener(&mut self, body: CollidableKey, listener: Box<dyn CollisionEventListener>) {
        self.queue.push(CollisionCommand::AddCollisionListener(body, listener));
    }

    /// Attach a contact listener after the flush
    pub fn add_contact_listener(&mut self, body: CollidableKey, listener: Box<dyn ContactEventListener>) {
        self.queue.push(CollisionCommand::AddContactListener(body, listener));
    }

    /// Detach a listener after the flush
    pub fn remove_listener(&mut self, key: ListenerKey) {
        self.queue.push(CollisionCommand::RemoveListener(key));
    }

    /// Skip the rect pair (`tag_a` on `a`, `tag_b` on `b`) in the next pass
    pub fn ignore_collision(
        &mut self,
        a: CollidableKey,
        b: CollidableKey,
        tag_a: impl Into<String>,
        tag_b: impl Into<String>,
    ) {
        self.queue.push(CollisionCommand::IgnoreCollision {
            a,
            b,
            tag_a: tag_a.into(),
            tag_b: tag_b.into(),
        });
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<CollisionCommand> {
        std::mem::take(&mut self.queue)
    }
}

/// Access handed to every listener call
pub struct ListenerContext<'a> {
    bodies: &'a mut HandleMap<CollidableKey, Box<dyn Collidable>>,
    commands: &'a mut CollisionCommands,
    app_data: &'a AppData,
}

impl<'a> ListenerContext<'a> {
    pub(crate) fn new(
        bodies: &'a mut HandleMap<CollidableKey, Box<dyn Collidable>>,
        commands: &'a mut CollisionCommands,
        app_data: &'a AppData,
    ) -> Self {
        Self { bodies, commands, app_data }
    }

    /// A registered body
    pub fn collidable(&self, key: CollidableKey) -> Option<&dyn Collidable> {
        self.bodies.get(key).map(|b| b.as_ref())
    }

    /// A registered body (mutable)
    pub fn collidable_mut(&mut self, key: CollidableKey) -> Option<&mut dyn Collidable> {
        match self.bodies.get_mut(key) {
            Some(body) => Some(body.as_mut()),
            None => None,
        }
    }

    /// A registered body downcast to its concrete type
    pub fn collidable_as<T: Collidable>(&self, key: CollidableKey) -> Option<&T> {
        self.bodies.get(key).and_then(|b| b.as_any().downcast_ref::<T>())
    }

    /// A registered body downcast to its concrete type (mutable)
    pub fn collidable_as_mut<T: Collidable>(&mut self, key: CollidableKey) -> Option<&mut T> {
        self.bodies.get_mut(key).and_then(|b| b.as_any_mut().downcast_mut::<T>())
    }

    /// Queue for structural changes
    pub fn commands(&mut self) -> &mut CollisionCommands {
        self.commands
    }

    /// Frame being flushed
    pub fn app_data(&self) -> &AppData {
        self.app_data
    }
}

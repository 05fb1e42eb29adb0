//! Handle-based collections
//!
//! Every cross-reference between collidables, pairs and listeners is a
//! generational key into an arena owned by the collision manager, so removing
//! a body can never leave a dangling reference behind.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Handle to a collidable registered with a collision manager
    pub struct CollidableKey;

    /// Handle to a per-body collision or contact listener
    pub struct ListenerKey;

    /// Handle to a manager-scoped listener
    pub struct ManagerListenerKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

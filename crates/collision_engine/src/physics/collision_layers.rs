//! Layer bits for broad-phase pair filtering (GEA 13.3.8)
//!
//! A pair is tested only when each body's layer is in the other's mask.

use bitflags::bitflags;

bitflags! {
    /// Collision layer definitions used to filter body pairs in the broad phase
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Pickups and collectibles
        const PICKUP = 1 << 5;

        // Bits 8-31 are left to the game
        const _ = !0;
    }
}

impl CollisionLayers {
    /// Check if two bodies should be tested against each other
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    pub fn should_collide(
        layer_a: CollisionLayers,
        mask_a: CollisionLayers,
        layer_b: CollisionLayers,
        mask_b: CollisionLayers,
    ) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }

    /// A user-defined layer in the range 8..32
    pub fn custom(bit: u32) -> CollisionLayers {
        debug_assert!((8..32).contains(&bit), "custom layers use bits 8-31");
        CollisionLayers::from_bits_retain(1 << bit)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        CollisionLayers::all()
    }
}

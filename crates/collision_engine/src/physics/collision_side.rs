//! The four sides a collision can be reported on

use std::fmt;

/// Side of a body that another body is touching
///
/// Sides are expressed in screen coordinates, so `Bottom` is the +y side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionSide {
    /// The -y side
    Top,
    /// The +y side
    Bottom,
    /// The -x side
    Left,
    /// The +x side
    Right,
}

impl CollisionSide {
    /// All sides, in declaration order
    pub const ALL: [CollisionSide; 4] = [
        CollisionSide::Top,
        CollisionSide::Bottom,
        CollisionSide::Left,
        CollisionSide::Right,
    ];

    /// The side facing this one
    pub fn opposite(self) -> Self {
        match self {
            CollisionSide::Top => CollisionSide::Bottom,
            CollisionSide::Bottom => CollisionSide::Top,
            CollisionSide::Left => CollisionSide::Right,
            CollisionSide::Right => CollisionSide::Left,
        }
    }

    /// True for `Top` and `Bottom`
    pub fn is_vertical(self) -> bool {
        matches!(self, CollisionSide::Top | CollisionSide::Bottom)
    }
}

impl fmt::Display for CollisionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionSide::Top => "top",
            CollisionSide::Bottom => "bottom",
            CollisionSide::Left => "left",
            CollisionSide::Right => "right",
        };
        f.write_str(name)
    }
}

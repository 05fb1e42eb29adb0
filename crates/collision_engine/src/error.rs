//! Error types for precondition violations

use thiserror::Error;

/// Errors raised when a caller breaks a precondition
///
/// Geometric degeneracies that occur during normal motion (zero-area rects,
/// masks sampled out of bounds) are never reported through this type; they
/// resolve to "no collision".
#[derive(Error, Debug)]
pub enum CollisionError {
    /// Geometry parameters rejected at construction
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Pixel mask data does not match its declared dimensions
    #[error("Invalid pixel mask: {0}")]
    InvalidPixelMask(String),

    /// The collidable handle does not refer to a registered collidable
    #[error("Unknown collidable")]
    UnknownCollidable,

    /// The listener handle does not refer to a registered listener
    #[error("Unknown listener")]
    UnknownListener,

    /// Image decoding failed while building a pixel mask
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result alias for collision operations
pub type CollisionResult<T> = Result<T, CollisionError>;

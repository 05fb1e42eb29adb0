//! Collision rect shapes and narrow-phase dispatch
//!
//! Based on Game Engine Architecture 3rd Edition (GEA 13.3.4):
//! - **Shape Variants**: boxes and polygons are filled and tested analytically
//! - **Alpha Masks**: pixel shapes are tested by sampling texel opacity
//! - **Stable Tags**: every rect carries a tag that survives geometry rebuilds
//!
//! # Module Organization
//!
//! - [`box_rect`] - Filled axis-aligned box
//! - [`polygon`] - Filled polygon and the analytic polygon tests
//! - [`pixel`] - Opacity masks and mask-backed rects
//! - [`pixel_iterator`] - Grid sampling used by the pixel scans
//! - [`rect`] - Tagged [`CollisionRect`] and the shape-pair dispatch

pub mod box_rect;
pub mod polygon;
pub mod pixel;
pub mod pixel_iterator;
pub mod rect;

pub use box_rect::{BoxCollisionRect, DEFAULT_FILLED_INCREMENT};
pub use polygon::{point_in_polygon, polygon_area, polygons_overlap, PolygonCollisionRect};
pub use pixel::{PixelCollisionRect, PixelMask, TexelRegion};
pub use pixel_iterator::PixelIterator;
pub use rect::{CollisionRect, RectShape};

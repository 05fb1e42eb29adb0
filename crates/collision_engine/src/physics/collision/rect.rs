//! Tagged collision rect and the shape-pair dispatch

use super::box_rect::BoxCollisionRect;
use super::pixel::PixelCollisionRect;
use super::pixel_iterator::PixelIterator;
use super::polygon::{polygons_overlap, PolygonCollisionRect};
use crate::debug::DrawContext;
use crate::error::CollisionResult;
use crate::foundation::math::{Rect, Vec2, Vec4};

/// Most sample points one pixel scan may visit
///
/// Regions that would need more are scanned on an evenly coarsened grid.
pub const MAX_SCAN_SAMPLES: u64 = 1 << 16;

/// Geometry of a collision rect
#[derive(Debug, Clone, PartialEq)]
pub enum RectShape {
    /// Filled axis-aligned box
    Box(BoxCollisionRect),
    /// Filled polygon
    Polygon(PolygonCollisionRect),
    /// Alpha-mask region
    Pixel(PixelCollisionRect),
}

impl RectShape {
    /// Bounding rect of the shape
    pub fn bounding_rect(&self) -> Rect {
        match self {
            RectShape::Box(b) => b.bounding_rect(),
            RectShape::Polygon(p) => p.bounding_rect(),
            RectShape::Pixel(p) => p.bounding_rect(),
        }
    }

    /// True for box and polygon shapes
    pub fn is_filled(&self) -> bool {
        !matches!(self, RectShape::Pixel(_))
    }

    /// Sampling step a pixel scan should use
    pub fn preferred_increment(&self) -> Vec2 {
        match self {
            RectShape::Box(b) => b.preferred_increment(),
            RectShape::Polygon(p) => p.preferred_increment(),
            RectShape::Pixel(p) => p.preferred_increment(),
        }
    }

    /// Point test; for pixel shapes this is the opacity of the texel under the point
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            RectShape::Box(b) => b.contains_point(point),
            RectShape::Polygon(p) => p.contains_point(point),
            RectShape::Pixel(p) => p.is_opaque_at(point),
        }
    }

    /// True when the shape can never collide
    pub fn is_degenerate(&self) -> bool {
        match self {
            RectShape::Box(b) => b.is_degenerate(),
            RectShape::Polygon(p) => p.is_degenerate(),
            RectShape::Pixel(p) => p.is_degenerate(),
        }
    }

    fn outline(&self) -> Vec<Vec2> {
        match self {
            RectShape::Box(b) => b.vertices().to_vec(),
            RectShape::Polygon(p) => p.vertices().to_vec(),
            RectShape::Pixel(p) => p.rotated_corners().to_vec(),
        }
    }

    fn shift(&mut self, offset: Vec2) {
        match self {
            RectShape::Box(b) => b.shift(offset),
            RectShape::Polygon(p) => p.shift(offset),
            RectShape::Pixel(p) => p.shift(offset),
        }
    }
}

impl From<BoxCollisionRect> for RectShape {
    fn from(shape: BoxCollisionRect) -> Self {
        RectShape::Box(shape)
    }
}

impl From<PolygonCollisionRect> for RectShape {
    fn from(shape: PolygonCollisionRect) -> Self {
        RectShape::Polygon(shape)
    }
}

impl From<PixelCollisionRect> for RectShape {
    fn from(shape: PixelCollisionRect) -> Self {
        RectShape::Pixel(shape)
    }
}

/// A tagged collision shape owned by one collidable
///
/// The tag identifies the rect across frames, including across geometry
/// rebuilds, and never changes once constructed. The previous rect is the
/// bounding rect as it stood at the start of the last collision pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRect {
    tag: String,
    shape: RectShape,
    previous: Rect,
}

impl CollisionRect {
    /// Wrap a shape under `tag`
    pub fn new(tag: impl Into<String>, shape: impl Into<RectShape>) -> Self {
        let shape = shape.into();
        let previous = shape.bounding_rect();
        Self { tag: tag.into(), shape, previous }
    }

    /// Filled box rect
    pub fn new_box(tag: impl Into<String>, rect: Rect) -> CollisionResult<Self> {
        Ok(Self::new(tag, BoxCollisionRect::new(rect)?))
    }

    /// Filled polygon rect
    pub fn new_polygon(tag: impl Into<String>, vertices: Vec<Vec2>) -> CollisionResult<Self> {
        Ok(Self::new(tag, PolygonCollisionRect::new(vertices)?))
    }

    /// Stable identifier
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Underlying geometry
    pub fn shape(&self) -> &RectShape {
        &self.shape
    }

    /// Current bounding rect
    pub fn current_rect(&self) -> Rect {
        self.shape.bounding_rect()
    }

    /// Bounding rect at the start of the previous pass
    pub fn previous_rect(&self) -> Rect {
        self.previous
    }

    /// True for box and polygon shapes
    pub fn is_filled(&self) -> bool {
        self.shape.is_filled()
    }

    /// Sampling step a pixel scan should use
    pub fn preferred_increment(&self) -> Vec2 {
        self.shape.preferred_increment()
    }

    /// Point test against the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.shape.contains_point(point)
    }

    /// True when the shape can never collide
    pub fn is_degenerate(&self) -> bool {
        self.shape.is_degenerate()
    }

    /// Translate the geometry; tag and kind are untouched
    pub fn shift(&mut self, offset: Vec2) {
        self.shape.shift(offset);
    }

    /// Record the current bounds as last frame's
    pub(crate) fn advance_frame(&mut self) {
        self.previous = self.current_rect();
    }

    pub(crate) fn inherit_previous_rect(&mut self, previous: Rect) {
        self.previous = previous;
    }

    /// Render the outline into a debug draw context
    pub fn draw(&self, context: &mut dyn DrawContext, color: Vec4) {
        match &self.shape {
            RectShape::Box(b) => context.draw_rect(b.rect(), color, false),
            RectShape::Polygon(p) => context.draw_polygon(p.vertices(), color),
            RectShape::Pixel(p) => context.draw_polygon(&p.rotated_corners(), color),
        }
    }

    /// Narrow-phase test between two rects
    ///
    /// Filled pairs are resolved analytically. Any pair with a pixel shape is
    /// resolved by sampling the overlap of the bounding rects, stepping at the
    /// pixel shape's increment (the finer of the two for pixel pairs), capped
    /// at [`MAX_SCAN_SAMPLES`] points. The result does not depend on argument
    /// order.
    pub fn check_collision(a: &CollisionRect, b: &CollisionRect) -> bool {
        if a.is_degenerate() || b.is_degenerate() {
            return false;
        }
        let Some(region) = a.current_rect().intersection(&b.current_rect()) else {
            return false;
        };

        match (&a.shape, &b.shape) {
            (RectShape::Box(x), RectShape::Box(y)) => x.overlaps(y),
            (RectShape::Pixel(p), RectShape::Pixel(q)) => {
                let (ip, iq) = (p.preferred_increment(), q.preferred_increment());
                let increment = Vec2::new(ip.x.min(iq.x), ip.y.min(iq.y));
                PixelIterator::new(region, increment)
                    .with_sample_limit(MAX_SCAN_SAMPLES)
                    .any(|point| p.is_opaque_at(point) && q.is_opaque_at(point))
            }
            (RectShape::Pixel(pixel), filled) | (filled, RectShape::Pixel(pixel)) => {
                PixelIterator::new(region, pixel.preferred_increment())
                    .with_sample_limit(MAX_SCAN_SAMPLES)
                    .any(|point| filled.contains_point(point) && pixel.is_opaque_at(point))
            }
            (x, y) => polygons_overlap(&x.outline(), &y.outline()),
        }
    }

    /// Vector that moves `b` out of `a` along the axis of least penetration
    ///
    /// Computed on bounding rects. Each component carries the sign of the
    /// direction from `a`'s centre to `b`'s. When both axes penetrate equally
    /// both components are returned and the caller's tie rule decides. The
    /// zero vector means no overlap or a degenerate shape.
    pub fn get_collision_offset(a: &CollisionRect, b: &CollisionRect) -> Vec2 {
        if a.is_degenerate() || b.is_degenerate() {
            return Vec2::zeros();
        }
        let (ra, rb) = (a.current_rect(), b.current_rect());
        let Some(overlap) = ra.intersection(&rb) else {
            return Vec2::zeros();
        };

        let dx = if rb.center().x >= ra.center().x { overlap.width } else { -overlap.width };
        let dy = if rb.center().y >= ra.center().y { overlap.height } else { -overlap.height };
        if overlap.width < overlap.height {
            Vec2::new(dx, 0.0)
        } else if overlap.height < overlap.width {
            Vec2::new(0.0, dy)
        } else {
            Vec2::new(dx, dy)
        }
    }
}

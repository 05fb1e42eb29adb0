//! Filled polygon and the analytic polygon tests shared by filled shapes

use crate::error::{CollisionError, CollisionResult};
use crate::foundation::math::{cross, Rect, Vec2};
use super::box_rect::DEFAULT_FILLED_INCREMENT;

/// Polygons whose absolute area falls below this never collide
const DEGENERATE_AREA: f32 = 1e-6;

/// Filled polygon in world space
///
/// Vertices may wind either way and the polygon may be concave; containment
/// uses the even-odd rule, so self-intersecting outlines are accepted too.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCollisionRect {
    vertices: Vec<Vec2>,
    bounds: Rect,
    increment: Vec2,
}

impl PolygonCollisionRect {
    /// Create a polygon collision shape from world-space vertices
    pub fn new(vertices: Vec<Vec2>) -> CollisionResult<Self> {
        if vertices.len() < 3 {
            return Err(CollisionError::InvalidGeometry(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(CollisionError::InvalidGeometry("non-finite polygon vertex".to_string()));
        }
        let bounds = Rect::from_points(vertices.iter().copied()).unwrap_or_default();
        Ok(Self {
            vertices,
            bounds,
            increment: Vec2::new(DEFAULT_FILLED_INCREMENT, DEFAULT_FILLED_INCREMENT),
        })
    }

    /// Override the preferred sampling increment (builder pattern)
    pub fn with_increment(mut self, increment: Vec2) -> CollisionResult<Self> {
        if !(increment.x > 0.0 && increment.y > 0.0) {
            return Err(CollisionError::InvalidGeometry(format!("increment must be positive, got {increment:?}")));
        }
        self.increment = increment;
        Ok(self)
    }

    /// Vertices in world space
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Bounding rect of the vertices
    pub fn bounding_rect(&self) -> Rect {
        self.bounds
    }

    /// Sampling step for pixel scans driven by this polygon
    pub fn preferred_increment(&self) -> Vec2 {
        self.increment
    }

    /// Unsigned area (shoelace formula)
    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    /// True when the polygon covers no area
    pub fn is_degenerate(&self) -> bool {
        self.area() < DEGENERATE_AREA
    }

    /// Even-odd point containment
    pub fn contains_point(&self, point: Vec2) -> bool {
        !self.is_degenerate() && point_in_polygon(&self.vertices, point)
    }

    pub(crate) fn shift(&mut self, offset: Vec2) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.bounds = self.bounds.translated(offset);
    }
}

/// Unsigned polygon area
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice_area: f32 = (0..n)
        .map(|i| cross(vertices[i], vertices[(i + 1) % n]))
        .sum();
    (twice_area * 0.5).abs()
}

/// Even-odd rule: count edge crossings of a ray cast towards +x
pub fn point_in_polygon(vertices: &[Vec2], point: Vec2) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Slab widths and span overlaps at or below this count as touching
const OVERLAP_EPSILON: f32 = 1e-4;

fn edges(poly: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = poly.len();
    (0..n).map(move |i| (poly[i], poly[(i + 1) % n]))
}

/// X where segments `a1-a2` and `b1-b2` meet at a single point
///
/// Parallel segments yield nothing; where they overlap, their endpoints are
/// vertices and already bound a slab.
fn crossing_x(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<f32> {
    let (da, db) = (a2 - a1, b2 - b1);
    let denom = cross(da, db);
    if denom.abs() <= f32::EPSILON * da.norm() * db.norm() {
        return None;
    }
    let t = cross(b1 - a1, db) / denom;
    let u = cross(b1 - a1, da) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| a1.x + t * da.x)
}

/// Even-odd spans of `poly` along the vertical line through `x`
///
/// `x` must not be a vertex x, so every edge it meets is crossed once.
fn spans_at(poly: &[Vec2], x: f32) -> Vec<(f32, f32)> {
    let mut ys: Vec<f32> = edges(poly)
        .filter(|(p, q)| (p.x > x) != (q.x > x))
        .map(|(p, q)| p.y + (x - p.x) * (q.y - p.y) / (q.x - p.x))
        .collect();
    ys.sort_by(f32::total_cmp);
    ys.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Analytic overlap of two filled polygons
///
/// True only when the shared region has area. Shapes that merely touch along
/// an edge or at a corner do not overlap, matching the strict test used for
/// boxes.
///
/// Every vertex x and every edge crossing x splits the plane into vertical
/// slabs. No edges cross inside a slab, so the two cross-sections at a slab's
/// midline overlap exactly when the polygons share area in that slab.
pub fn polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if polygon_area(a) < DEGENERATE_AREA || polygon_area(b) < DEGENERATE_AREA {
        return false;
    }
    let (Some(bounds_a), Some(bounds_b)) = (
        Rect::from_points(a.iter().copied()),
        Rect::from_points(b.iter().copied()),
    ) else {
        return false;
    };
    let Some(shared) = bounds_a.intersection(&bounds_b) else {
        return false;
    };
    let (left, right) = (shared.left(), shared.right());

    let mut xs: Vec<f32> = a.iter().chain(b).map(|v| v.x).collect();
    for (a1, a2) in edges(a) {
        xs.extend(edges(b).filter_map(|(b1, b2)| crossing_x(a1, a2, b1, b2)));
    }
    xs.push(left);
    xs.push(right);
    xs.retain(|x| (left..=right).contains(x));
    xs.sort_by(f32::total_cmp);
    xs.dedup();

    xs.windows(2).filter(|w| w[1] - w[0] > OVERLAP_EPSILON).any(|w| {
        let mid = (w[0] + w[1]) * 0.5;
        let spans_b = spans_at(b, mid);
        spans_at(a, mid).iter().any(|&(lo_a, hi_a)| {
            spans_b.iter().any(|&(lo_b, hi_b)| hi_a.min(hi_b) - lo_a.max(lo_b) > OVERLAP_EPSILON)
        })
    })
}

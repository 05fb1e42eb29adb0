//! Alpha-mask collision shapes
//!
//! A [`PixelMask`] is an opacity bitmap computed once per texture and shared
//! by every [`PixelCollisionRect`] that samples it. The rect maps a region of
//! the mask onto a destination rect in world space, optionally rotated about
//! the destination centre and mirrored.

use std::path::Path;
use std::sync::Arc;

use crate::error::{CollisionError, CollisionResult};
use crate::foundation::math::{rotate_point, Rect, Vec2};

/// Precomputed opacity bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    opaque: Vec<bool>,
}

impl PixelMask {
    /// Build from one opacity flag per texel, row-major
    pub fn from_opacity(width: u32, height: u32, opaque: Vec<bool>) -> CollisionResult<Self> {
        let expected = width as usize * height as usize;
        if opaque.len() != expected {
            return Err(CollisionError::InvalidPixelMask(format!(
                "{width}x{height} mask needs {expected} texels, got {}",
                opaque.len()
            )));
        }
        Ok(Self { width, height, opaque })
    }

    /// Build from one alpha byte per texel; texels at or above `threshold` are solid
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8], threshold: u8) -> CollisionResult<Self> {
        let opaque = alpha.iter().map(|&a| a >= threshold.max(1)).collect();
        Self::from_opacity(width, height, opaque)
    }

    /// Build from the alpha channel of an RGBA image
    pub fn from_rgba_image(image: &image::RgbaImage, threshold: u8) -> Self {
        let opaque = image.pixels().map(|p| p.0[3] >= threshold.max(1)).collect();
        Self {
            width: image.width(),
            height: image.height(),
            opaque,
        }
    }

    /// Decode an image file and build its mask
    pub fn load<P: AsRef<Path>>(path: P, threshold: u8) -> CollisionResult<Self> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::from_rgba_image(&image, threshold))
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opacity of a texel; anything outside the mask is transparent
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.opaque[y as usize * self.width as usize + x as usize]
    }

    /// True if any texel inside `region` is solid
    pub fn any_opaque_in(&self, region: TexelRegion) -> bool {
        (region.y..region.y + region.height).any(|y| {
            (region.x..region.x + region.width).any(|x| self.is_opaque(i64::from(x), i64::from(y)))
        })
    }

    /// Number of solid texels
    pub fn opaque_count(&self) -> usize {
        self.opaque.iter().filter(|&&o| o).count()
    }
}

/// Integer texel rectangle inside a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexelRegion {
    /// Left texel column
    pub x: u32,
    /// Top texel row
    pub y: u32,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
}

impl TexelRegion {
    /// Create a texel region
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Region covering a whole mask
    pub fn whole(mask: &PixelMask) -> Self {
        Self::new(0, 0, mask.width(), mask.height())
    }
}

/// Non-filled collision shape backed by an alpha mask
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCollisionRect {
    mask: Arc<PixelMask>,
    source: TexelRegion,
    destination: Rect,
    rotation: f32,
    mirror_horizontal: bool,
    mirror_vertical: bool,
    bounds: Rect,
}

impl PixelCollisionRect {
    /// Map `source` texels of `mask` onto `destination` in world space
    pub fn new(mask: Arc<PixelMask>, source: TexelRegion, destination: Rect) -> CollisionResult<Self> {
        if source.width == 0 || source.height == 0 {
            return Err(CollisionError::InvalidGeometry(format!("empty source region {source:?}")));
        }
        if u64::from(source.x) + u64::from(source.width) > u64::from(mask.width())
            || u64::from(source.y) + u64::from(source.height) > u64::from(mask.height())
        {
            return Err(CollisionError::InvalidGeometry(format!(
                "source region {source:?} exceeds {}x{} mask",
                mask.width(),
                mask.height()
            )));
        }
        if !destination.is_finite() || destination.width < 0.0 || destination.height < 0.0 {
            return Err(CollisionError::InvalidGeometry(format!("invalid destination {destination:?}")));
        }
        let mut rect = Self {
            mask,
            source,
            destination,
            rotation: 0.0,
            mirror_horizontal: false,
            mirror_vertical: false,
            bounds: destination,
        };
        rect.update_bounds();
        Ok(rect)
    }

    /// Map a whole mask onto `destination`
    pub fn whole_mask(mask: Arc<PixelMask>, destination: Rect) -> CollisionResult<Self> {
        let source = TexelRegion::whole(&mask);
        Self::new(mask, source, destination)
    }

    /// Rotate about the destination centre, in degrees (builder pattern)
    pub fn with_rotation(mut self, degrees: f32) -> CollisionResult<Self> {
        if !degrees.is_finite() {
            return Err(CollisionError::InvalidGeometry("non-finite rotation".to_string()));
        }
        self.rotation = degrees;
        self.update_bounds();
        Ok(self)
    }

    /// Mirror the texture horizontally and/or vertically (builder pattern)
    pub fn with_mirroring(mut self, horizontal: bool, vertical: bool) -> Self {
        self.mirror_horizontal = horizontal;
        self.mirror_vertical = vertical;
        self
    }

    /// Shared mask
    pub fn mask(&self) -> &Arc<PixelMask> {
        &self.mask
    }

    /// Source region in texels
    pub fn source(&self) -> TexelRegion {
        self.source
    }

    /// Destination rect before rotation
    pub fn destination(&self) -> Rect {
        self.destination
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Bounding rect of the (possibly rotated) destination
    pub fn bounding_rect(&self) -> Rect {
        self.bounds
    }

    /// Destination corners after rotation
    pub fn rotated_corners(&self) -> [Vec2; 4] {
        let center = self.destination.center();
        self.destination.corners().map(|c| rotate_point(c, center, self.rotation))
    }

    /// Size of one texel in world units
    ///
    /// When rotated, the finer axis is used for both so a scan cannot step
    /// over a texel.
    pub fn preferred_increment(&self) -> Vec2 {
        let step = Vec2::new(
            self.destination.width / self.source.width as f32,
            self.destination.height / self.source.height as f32,
        );
        if self.rotation == 0.0 {
            step
        } else {
            let fine = step.x.min(step.y);
            Vec2::new(fine, fine)
        }
    }

    /// True when the region is fully transparent or maps to no area
    pub fn is_degenerate(&self) -> bool {
        self.destination.is_empty() || !self.mask.any_opaque_in(self.source)
    }

    /// Opacity of the texel under a world-space point
    pub fn is_opaque_at(&self, point: Vec2) -> bool {
        let dst = self.destination;
        if dst.is_empty() {
            return false;
        }
        let local = rotate_point(point, dst.center(), -self.rotation);
        if !dst.contains_point(local) {
            return false;
        }

        let texel = |offset: f32, extent: f32, texels: u32, mirrored: bool| -> i64 {
            let t = ((offset / extent) * texels as f32).floor() as i64;
            let t = t.clamp(0, i64::from(texels) - 1);
            if mirrored { i64::from(texels) - 1 - t } else { t }
        };
        let tx = texel(local.x - dst.x, dst.width, self.source.width, self.mirror_horizontal);
        let ty = texel(local.y - dst.y, dst.height, self.source.height, self.mirror_vertical);
        self.mask.is_opaque(i64::from(self.source.x) + tx, i64::from(self.source.y) + ty)
    }

    pub(crate) fn shift(&mut self, offset: Vec2) {
        self.destination = self.destination.translated(offset);
        self.bounds = self.bounds.translated(offset);
    }

    fn update_bounds(&mut self) {
        self.bounds = if self.rotation == 0.0 {
            self.destination
        } else {
            Rect::from_points(self.rotated_corners()).unwrap_or(self.destination)
        };
    }
}

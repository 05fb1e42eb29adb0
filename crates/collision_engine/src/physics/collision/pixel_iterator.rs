//! Grid sampling over a region, used by the pixel scans

use crate::foundation::math::{Rect, Vec2};

/// Iterator over sample points covering `region` on a grid of `increment`
///
/// Samples sit at cell centres, anchored at the region's top-left corner, so
/// two scans over the same region with the same increment visit the same
/// points. A trailing partial cell is sampled at its own centre, which keeps
/// every sample inside the half-open region.
#[derive(Debug, Clone)]
pub struct PixelIterator {
    region: Rect,
    increment: Vec2,
    columns: u64,
    rows: u64,
    index: u64,
}

impl PixelIterator {
    /// Create an iterator; an empty region or a non-positive increment yields nothing
    pub fn new(region: Rect, increment: Vec2) -> Self {
        let usable = !region.is_empty()
            && region.is_finite()
            && increment.x > 0.0
            && increment.y > 0.0;
        let (columns, rows) = if usable {
            (
                (region.width / increment.x).ceil() as u64,
                (region.height / increment.y).ceil() as u64,
            )
        } else {
            (0, 0)
        };
        Self { region, increment, columns, rows, index: 0 }
    }

    /// Region being scanned
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Step between samples
    pub fn increment(&self) -> Vec2 {
        self.increment
    }

    /// Total number of samples
    pub fn sample_count(&self) -> u64 {
        self.columns * self.rows
    }

    /// Widen the step evenly on both axes until at most `max_samples` remain
    ///
    /// A limit of zero leaves the grid as it is.
    pub fn with_sample_limit(self, max_samples: u64) -> Self {
        if max_samples == 0 {
            return self;
        }
        let mut limited = self;
        // An axis already down to one cell gives nothing back, and partial
        // cells round up, so one rescale may not be enough
        while limited.sample_count() > max_samples {
            let excess = limited.sample_count() as f64 / max_samples as f64;
            let scale = excess.sqrt().max(1.05) as f32;
            limited = Self::new(limited.region, limited.increment * scale);
        }
        limited
    }

    fn cell_center(start: f32, step: f32, cell: u64, end: f32) -> f32 {
        let lo = start + step * cell as f32;
        let hi = (lo + step).min(end);
        (lo + hi) * 0.5
    }
}

impl Iterator for PixelIterator {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.index >= self.sample_count() {
            return None;
        }
        let row = self.index / self.columns;
        let column = self.index % self.columns;
        self.index += 1;
        Some(Vec2::new(
            Self::cell_center(self.region.left(), self.increment.x, column, self.region.right()),
            Self::cell_center(self.region.top(), self.increment.y, row, self.region.bottom()),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.sample_count() - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

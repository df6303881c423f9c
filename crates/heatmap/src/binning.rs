//! Spatially binned accumulation.
//!
//! When there are many more points than screen cells, points are first
//! aggregated into a pixel-aligned grid of `bin_size` squares and a single
//! stamp is drawn per non-empty bin, at the intensity-weighted centroid. This
//! bounds the stamping cost by viewport area instead of point count.
//!
//! ## Grid alignment
//!
//! The grid is anchored to the first finite point rather than the screen
//! origin. Anchoring to the screen would make points hop between bins as the
//! view pans by sub-bin amounts, and the result visibly ripples.
//!
//! ## Tracked region
//!
//! Only bins on the viewport, plus `ceil(r2 / bin_size)` bins on every side
//! (their stamps still reach the viewport) and one extra bin for the anchor
//! offset, are tracked; points outside are dropped.

use std::collections::BTreeMap;
use tracing::debug;

use crate::geometry::{DataPoint, IntensityRange, ScreenPoint};
use crate::kernel::{Kernel, MAX_RADIUS_SUM};
use crate::points::{stamp_opacity, AccumulationStats};
use crate::style::BinningMode;
use crate::surface::RasterSurface;

/// Lower bound on the automatically chosen bin size, in pixels.
pub const MIN_AUTO_BIN_SIZE: u32 = 3;

/// Bin size used for `On`/`Auto` binning: `max(floor(r2 / 8), 3)`.
pub fn auto_bin_size(radius_sum: f64) -> u32 {
    let size = (radius_sum / 8.0).floor();
    if size.is_finite() && size > MIN_AUTO_BIN_SIZE as f64 {
        size as u32
    } else {
        MIN_AUTO_BIN_SIZE
    }
}

/// Decide whether (and with which bin size) to bin this build.
///
/// `Auto` bins only when the viewport, grown by one kernel radius on each
/// side, has fewer cells than there are points.
pub fn choose_bin_size(
    mode: BinningMode,
    radius_sum: f64,
    viewport: (u32, u32),
    point_count: usize,
) -> Option<u32> {
    match mode {
        BinningMode::Off => None,
        BinningMode::Fixed(0) => None,
        BinningMode::Fixed(size) => Some(size),
        BinningMode::On => Some(auto_bin_size(radius_sum)),
        BinningMode::Auto => {
            let size = auto_bin_size(radius_sum);
            let cells = |extent: u32| ((extent as f64 + radius_sum * 2.0) / size as f64).ceil();
            let bins = cells(viewport.0) * cells(viewport.1);
            if bins >= point_count as f64 {
                None
            } else {
                Some(size)
            }
        }
    }
}

/// Grid cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinKey {
    pub row: i64,
    pub col: i64,
}

/// Aggregate of the points that fell into one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bin {
    /// Sum of intensities
    pub weight: f64,
    /// Alpha-over composition of the intensities, in `[0, 1]`
    pub intensity_mix: f64,
    pub weighted_x: f64,
    pub weighted_y: f64,
}

impl Bin {
    /// Fold one point in. `intensity` must already be in `(0, 1]`.
    pub fn add(&mut self, position: ScreenPoint, intensity: f64) {
        self.weight += intensity;
        self.intensity_mix += (1.0 - self.intensity_mix) * intensity;
        self.weighted_x += position.x * intensity;
        self.weighted_y += position.y * intensity;
    }

    pub fn is_empty(&self) -> bool {
        self.weight <= 0.0
    }

    pub fn centroid(&self) -> ScreenPoint {
        ScreenPoint::new(self.weighted_x / self.weight, self.weighted_y / self.weight)
    }

    pub fn opacity(&self) -> f32 {
        stamp_opacity(self.intensity_mix)
    }
}

/// Transient bin grid for one build pass.
#[derive(Debug)]
pub struct BinGrid {
    bin_size: f64,
    /// Extra bins tracked beyond the viewport on each side
    reach: i64,
    cols: i64,
    rows: i64,
    offset: Option<ScreenPoint>,
    bins: BTreeMap<BinKey, Bin>,
}

impl BinGrid {
    /// `radius_sum` is clamped to `[0, MAX_RADIUS_SUM]`; non-finite values
    /// track no margin.
    pub fn new(bin_size: u32, radius_sum: f64, viewport: (u32, u32)) -> Self {
        let size = bin_size.max(1) as f64;
        let radius_sum = if radius_sum.is_finite() {
            radius_sum.clamp(0.0, MAX_RADIUS_SUM as f64)
        } else {
            0.0
        };
        let reach = (radius_sum / size).ceil() as i64;
        let span = |extent: u32| (extent as f64 / size).ceil() as i64 + reach * 2 + 2;
        Self {
            bin_size: size,
            reach,
            cols: span(viewport.0),
            rows: span(viewport.1),
            offset: None,
            bins: BTreeMap::new(),
        }
    }

    /// Grid anchor, set from the first finite point seen.
    pub fn offset(&self) -> Option<ScreenPoint> {
        self.offset
    }

    /// Grid dimensions `(cols, rows)` including the tracked margin.
    pub fn dimensions(&self) -> (i64, i64) {
        (self.cols, self.rows)
    }

    /// Address of the cell containing `position`, or `None` when it is
    /// non-finite or outside the tracked region. The first finite position
    /// fixes the grid anchor.
    pub fn key_for(&mut self, position: ScreenPoint) -> Option<BinKey> {
        if !position.is_finite() {
            return None;
        }
        let size = self.bin_size;
        let offset = *self.offset.get_or_insert_with(|| {
            ScreenPoint::new(position.x.rem_euclid(size), position.y.rem_euclid(size))
        });

        let col = ((position.x - offset.x) / size).floor() as i64 + self.reach + 1;
        if col < 0 || col >= self.cols {
            return None;
        }
        let row = ((position.y - offset.y) / size).floor() as i64 + self.reach + 1;
        if row < 0 || row >= self.rows {
            return None;
        }
        Some(BinKey { row, col })
    }

    /// Screen-space bounds `(min, max)` covered by a cell.
    pub fn bin_bounds(&self, key: BinKey) -> (ScreenPoint, ScreenPoint) {
        let offset = self.offset.unwrap_or_default();
        let left = offset.x + (key.col - self.reach - 1) as f64 * self.bin_size;
        let top = offset.y + (key.row - self.reach - 1) as f64 * self.bin_size;
        (
            ScreenPoint::new(left, top),
            ScreenPoint::new(left + self.bin_size, top + self.bin_size),
        )
    }

    /// Add a point; returns `false` if it was excluded.
    pub fn insert(&mut self, point: &DataPoint, range: IntensityRange) -> bool {
        let Some(key) = self.key_for(point.position) else {
            return false;
        };
        let intensity = range.normalize(point.intensity);
        if intensity.is_nan() || intensity <= 0.0 {
            return false;
        }
        self.bins
            .entry(key)
            .or_default()
            .add(point.position, intensity.min(1.0));
        true
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, key: BinKey) -> Option<&Bin> {
        self.bins.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BinKey, &Bin)> {
        self.bins.iter()
    }

    /// Stamp one kernel per non-empty bin at its centroid, consuming the grid.
    pub fn stamp(self, surface: &mut dyn RasterSurface, kernel: &Kernel) -> usize {
        let offset = kernel.half_extent();
        let mut stamped = 0;
        for bin in self.bins.values().filter(|b| !b.is_empty()) {
            let center = bin.centroid();
            surface.stamp_kernel(kernel, center.x - offset, center.y - offset, bin.opacity());
            stamped += 1;
        }
        stamped
    }
}

/// Accumulates points through a [`BinGrid`] with a fixed bin size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinnedAccumulator {
    pub bin_size: u32,
}

impl BinnedAccumulator {
    pub fn new(bin_size: u32) -> Self {
        Self { bin_size }
    }

    pub fn accumulate(
        &self,
        surface: &mut dyn RasterSurface,
        kernel: &Kernel,
        points: &[DataPoint],
        range: IntensityRange,
        radius_sum: f64,
    ) -> AccumulationStats {
        let viewport = (surface.width(), surface.height());
        let mut grid = BinGrid::new(self.bin_size, radius_sum, viewport);

        let mut skipped = 0;
        for point in points {
            if !grid.insert(point, range) {
                skipped += 1;
            }
        }

        let bins = grid.len();
        let stamped = grid.stamp(surface, kernel);
        debug!(
            bin_size = self.bin_size,
            points = points.len(),
            bins,
            skipped,
            "Binned heatmap accumulation"
        );

        AccumulationStats {
            stamped,
            skipped,
            bins,
        }
    }
}

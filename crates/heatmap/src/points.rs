//! Direct accumulation: one kernel stamp per point.

use crate::geometry::{DataPoint, IntensityRange};
use crate::kernel::Kernel;
use crate::surface::RasterSurface;

/// Smallest opacity a stamp is drawn with. Anything fainter disappears in an
/// 8-bit alpha readback, so faint points are lifted rather than dropped.
pub const MIN_STAMP_OPACITY: f64 = 0.01;

/// Clamp a normalized intensity to the drawable opacity range.
#[inline]
pub fn stamp_opacity(intensity: f64) -> f32 {
    intensity.clamp(MIN_STAMP_OPACITY, 1.0) as f32
}

/// Counts from one accumulation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccumulationStats {
    /// Kernel stamps drawn
    pub stamped: usize,
    /// Points excluded (non-positive intensity, non-finite or out of range)
    pub skipped: usize,
    /// Non-empty bins (0 for direct accumulation)
    pub bins: usize,
}

/// Stamp `kernel` centered on every point with positive normalized intensity.
pub fn accumulate_points(
    surface: &mut dyn RasterSurface,
    kernel: &Kernel,
    points: &[DataPoint],
    range: IntensityRange,
) -> AccumulationStats {
    let mut stats = AccumulationStats::default();
    let offset = kernel.half_extent();

    for point in points {
        let intensity = range.normalize(point.intensity);
        if intensity.is_nan() || intensity <= 0.0 || !point.position.is_finite() {
            stats.skipped += 1;
            continue;
        }
        surface.stamp_kernel(
            kernel,
            point.position.x - offset,
            point.position.y - offset,
            stamp_opacity(intensity),
        );
        stats.stamped += 1;
    }

    stats
}

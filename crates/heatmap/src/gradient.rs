//! Density-to-color lookup table.
//!
//! The table is produced the same way a canvas would: fill a 1×256 strip with
//! a vertical linear gradient through the configured stops and read the strip
//! back. Entry `i` is the (straight-alpha) color for accumulated alpha `i`.

use tiny_skia::{Color, GradientStop, LinearGradient, Paint, Pixmap, Point, Rect, SpreadMode, Transform};
use tracing::debug;

use crate::error::{HeatmapError, HeatmapResult};
use crate::style::ColorStop;

/// Number of entries in the lookup table (one per 8-bit alpha value).
pub const LUT_SIZE: usize = 256;

/// Color value in straight-alpha RGBA format
pub type Rgba = [u8; 4];

/// 256-entry RGBA lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientLut {
    entries: Box<[Rgba; LUT_SIZE]>,
}

impl GradientLut {
    /// Build the table from color stops.
    ///
    /// Stops are ordered by offset (stable, so equal offsets keep their
    /// given order and produce a hard edge). Malformed stops fail the build.
    pub fn build(stops: &[ColorStop]) -> HeatmapResult<Self> {
        if stops.is_empty() {
            return Err(HeatmapError::config("gradient needs at least one color stop"));
        }

        let mut resolved = Vec::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            stop.validate()
                .map_err(|e| HeatmapError::config(format!("color stop {}: {}", idx, e)))?;
            let [r, g, b, a] = stop.color.resolve()?;
            let color = Color::from_rgba(r, g, b, a)
                .ok_or_else(|| HeatmapError::config(format!("color stop {} is not representable", idx)))?;
            resolved.push(GradientStop::new(stop.offset, color));
        }
        let mut offsets: Vec<(f32, GradientStop)> = stops
            .iter()
            .map(|s| s.offset)
            .zip(resolved)
            .collect();
        offsets.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let gradient_stops: Vec<GradientStop> = offsets.into_iter().map(|(_, stop)| stop).collect();

        let mut strip = Pixmap::new(1, LUT_SIZE as u32)
            .ok_or_else(|| HeatmapError::Surface("cannot allocate gradient strip".to_string()))?;

        let shader = LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(0.0, LUT_SIZE as f32),
            gradient_stops,
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| HeatmapError::config("gradient stops produced no shader"))?;

        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = false;

        let rect = Rect::from_xywh(0.0, 0.0, 1.0, LUT_SIZE as f32)
            .ok_or_else(|| HeatmapError::Surface("invalid gradient strip bounds".to_string()))?;
        strip.fill_rect(rect, &paint, Transform::identity(), None);

        let mut entries = Box::new([[0u8; 4]; LUT_SIZE]);
        for (entry, px) in entries.iter_mut().zip(strip.pixels()) {
            let c = px.demultiply();
            *entry = [c.red(), c.green(), c.blue(), c.alpha()];
        }

        debug!(stops = stops.len(), "Built gradient lookup table");
        Ok(Self { entries })
    }

    /// Color for an accumulated alpha value.
    #[inline]
    pub fn entry(&self, alpha: u8) -> Rgba {
        self.entries[alpha as usize]
    }

    pub fn entries(&self) -> &[Rgba] {
        &self.entries[..]
    }
}

/// Single-entry lookup table cache keyed by the color stops by value.
#[derive(Debug, Default)]
pub struct LutCache {
    cached: Option<(Vec<ColorStop>, GradientLut)>,
    builds: u64,
}

impl LutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table if the stops are unchanged, otherwise rebuild.
    pub fn get_or_build(&mut self, stops: &[ColorStop]) -> HeatmapResult<&GradientLut> {
        let entry = match self.cached.take() {
            Some((key, lut)) if key.as_slice() == stops => (key, lut),
            _ => {
                self.builds += 1;
                (stops.to_vec(), GradientLut::build(stops)?)
            }
        };
        Ok(&self.cached.insert(entry).1)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of tables built over the cache's lifetime.
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::RgbaSpec;

    fn blue_to_red() -> Vec<ColorStop> {
        vec![
            ColorStop::new(0.0, RgbaSpec::new(0.0, 0.0, 1.0, 0.0)),
            ColorStop::new(1.0, RgbaSpec::new(1.0, 0.0, 0.0, 1.0)),
        ]
    }

    #[test]
    fn test_lut_has_256_entries() {
        let lut = GradientLut::build(&blue_to_red()).unwrap();
        assert_eq!(lut.entries().len(), LUT_SIZE);
    }

    #[test]
    fn test_lut_endpoints() {
        let lut = GradientLut::build(&blue_to_red()).unwrap();
        let low = lut.entry(0);
        assert!(low[3] <= 1, "low alpha {}", low[3]);

        let high = lut.entry(255);
        assert!(high[0] >= 250, "high red {}", high[0]);
        assert!(high[2] <= 5, "high blue {}", high[2]);
        assert!(high[3] >= 250, "high alpha {}", high[3]);
    }

    #[test]
    fn test_lut_alpha_is_monotonic() {
        let lut = GradientLut::build(&blue_to_red()).unwrap();
        for pair in lut.entries().windows(2) {
            assert!(pair[1][3] >= pair[0][3]);
        }
    }

    #[test]
    fn test_unsorted_stops_are_ordered() {
        let mut stops = blue_to_red();
        stops.reverse();
        let sorted = GradientLut::build(&blue_to_red()).unwrap();
        let reversed = GradientLut::build(&stops).unwrap();
        assert_eq!(sorted, reversed);
    }

    #[test]
    fn test_single_stop_is_solid() {
        let stops = vec![ColorStop::new(0.5, RgbaSpec::new(0.0, 1.0, 0.0, 1.0))];
        let lut = GradientLut::build(&stops).unwrap();
        assert_eq!(lut.entry(0), [0, 255, 0, 255]);
        assert_eq!(lut.entry(200), [0, 255, 0, 255]);
    }

    #[test]
    fn test_malformed_stop_fails_fast() {
        let stops = vec![
            ColorStop::new(0.0, RgbaSpec::new(0.0, 0.0, 1.0, 0.0)),
            ColorStop::new(
                1.0,
                RgbaSpec {
                    r: Some(1.0),
                    g: Some(0.0),
                    b: Some(0.0),
                    a: None,
                },
            ),
        ];
        let err = GradientLut::build(&stops).unwrap_err();
        assert!(matches!(err, HeatmapError::Configuration(_)));
        assert!(GradientLut::build(&[]).is_err());
    }

    #[test]
    fn test_cache_compares_by_value() {
        let mut cache = LutCache::new();
        cache.get_or_build(&blue_to_red()).unwrap();
        cache.get_or_build(&blue_to_red()).unwrap();
        assert_eq!(cache.builds(), 1);

        let mut changed = blue_to_red();
        changed[1].offset = 0.8;
        cache.get_or_build(&changed).unwrap();
        assert_eq!(cache.builds(), 2);
    }
}

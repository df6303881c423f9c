//! Point and coordinate types shared by the accumulation stages.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, HeatmapResult};

/// A position in screen (display) pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const ORIGIN: ScreenPoint = ScreenPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A position in the host's data (world) coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An application-supplied sample: a world position and a raw magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub position: WorldPoint,
    pub intensity: f64,
}

impl HeatPoint {
    pub fn new(x: f64, y: f64, intensity: f64) -> Self {
        Self {
            position: WorldPoint::new(x, y),
            intensity,
        }
    }
}

/// A sample projected into screen space for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub position: ScreenPoint,
    pub intensity: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, intensity: f64) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            intensity,
        }
    }

    /// Build a projected point, rejecting non-finite screen positions.
    pub fn projected(position: ScreenPoint, intensity: f64) -> HeatmapResult<Self> {
        if !position.is_finite() {
            return Err(HeatmapError::SkippablePoint {
                x: position.x,
                y: position.y,
            });
        }
        Ok(Self {
            position,
            intensity,
        })
    }
}

/// Raw intensity bounds used to normalize samples to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntensityRange {
    pub min: f64,
    pub max: f64,
}

impl IntensityRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Compute bounds from raw intensities, ignoring non-finite values.
    ///
    /// An empty (or entirely non-finite) input yields `{0, 0}`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
                (min.min(v), max.max(v))
            });
        if min > max {
            return Self::default();
        }
        Self { min, max }
    }

    /// `max - min`, or `1` when the span is zero (uniform dataset).
    pub fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 || !range.is_finite() {
            1.0
        } else {
            range
        }
    }

    /// Map a raw intensity onto the `[0, 1]` scale. Values outside the
    /// bounds are not clamped here; callers decide how to treat them.
    #[inline]
    pub fn normalize(&self, intensity: f64) -> f64 {
        (intensity - self.min) / self.range()
    }
}

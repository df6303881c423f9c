//! Style and configuration for heatmap rendering.
//!
//! Styles are plain serde structs so hosts can load them from JSON, with an
//! explicit `validate()` pass that rejects malformed color stops up front
//! rather than letting them surface as transparent gradient segments.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{HeatmapError, HeatmapResult};
use crate::kernel::{KernelKey, MAX_RADIUS_SUM};

/// Color with channels in `[0, 1]`. Channels are optional so that a stop
/// missing one can be reported instead of silently rendered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbaSpec {
    #[serde(default)]
    pub r: Option<f32>,
    #[serde(default)]
    pub g: Option<f32>,
    #[serde(default)]
    pub b: Option<f32>,
    #[serde(default)]
    pub a: Option<f32>,
}

impl RgbaSpec {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: Some(r),
            g: Some(g),
            b: Some(b),
            a: Some(a),
        }
    }

    /// Resolve to `[r, g, b, a]`, failing on missing or out-of-range channels.
    pub fn resolve(&self) -> HeatmapResult<[f32; 4]> {
        let mut out = [0.0f32; 4];
        let channels = [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)];
        for (slot, (name, value)) in out.iter_mut().zip(channels) {
            let value = value
                .ok_or_else(|| HeatmapError::config(format!("color is missing channel '{}'", name)))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(HeatmapError::config(format!(
                    "color channel '{}' = {} is outside [0, 1]",
                    name, value
                )));
            }
            *slot = value;
        }
        Ok(out)
    }
}

/// A gradient stop: a position along the density axis and its color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: RgbaSpec,
}

impl ColorStop {
    pub fn new(offset: f32, color: RgbaSpec) -> Self {
        Self { offset, color }
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        if !(0.0..=1.0).contains(&self.offset) {
            return Err(HeatmapError::config(format!(
                "color stop offset {} is outside [0, 1]",
                self.offset
            )));
        }
        self.color.resolve().map(|_| ())
    }
}

/// Visual parameters for a heatmap build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStyle {
    /// Radius of each point's solid core, in pixels
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Width of the soft falloff around the core, in pixels
    #[serde(default = "default_blur_radius")]
    pub blur_radius: f32,

    /// Use a Gaussian profile instead of a blurred disc
    #[serde(default = "default_gaussian")]
    pub gaussian: bool,

    /// Density-to-color gradient
    #[serde(default = "default_color_stops")]
    pub color_stops: Vec<ColorStop>,
}

fn default_radius() -> f32 {
    10.0
}

fn default_blur_radius() -> f32 {
    10.0
}

fn default_gaussian() -> bool {
    true
}

fn default_color_stops() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, RgbaSpec::new(0.0, 0.0, 0.0, 0.0)),
        ColorStop::new(0.25, RgbaSpec::new(0.0, 0.0, 1.0, 0.5)),
        ColorStop::new(0.5, RgbaSpec::new(0.0, 1.0, 1.0, 0.6)),
        ColorStop::new(0.75, RgbaSpec::new(1.0, 1.0, 0.0, 0.7)),
        ColorStop::new(1.0, RgbaSpec::new(1.0, 0.0, 0.0, 0.8)),
    ]
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            blur_radius: default_blur_radius(),
            gaussian: default_gaussian(),
            color_stops: default_color_stops(),
        }
    }
}

impl HeatmapStyle {
    /// Total footprint radius of one stamp (`radius + blur_radius`).
    pub fn radius_sum(&self) -> f32 {
        self.radius + self.blur_radius
    }

    pub fn kernel_key(&self) -> KernelKey {
        KernelKey {
            radius: self.radius,
            blur_radius: self.blur_radius,
            gaussian: self.gaussian,
        }
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(HeatmapError::config(format!("radius must be >= 0, got {}", self.radius)));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(HeatmapError::config(format!(
                "blur_radius must be >= 0, got {}",
                self.blur_radius
            )));
        }
        if self.radius_sum() > MAX_RADIUS_SUM {
            return Err(HeatmapError::config(format!(
                "radius + blur_radius must be <= {}, got {}",
                MAX_RADIUS_SUM,
                self.radius_sum()
            )));
        }
        if self.color_stops.is_empty() {
            return Err(HeatmapError::config("gradient needs at least one color stop"));
        }
        for (idx, stop) in self.color_stops.iter().enumerate() {
            stop.validate()
                .map_err(|e| HeatmapError::config(format!("color stop {}: {}", idx, e)))?;
        }
        Ok(())
    }
}

/// Whether points are stamped directly or aggregated into screen bins first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinningMode {
    /// Always stamp every point
    Off,
    /// Always bin, with the size derived from the kernel radius
    On,
    /// Bin only when there are more points than screen bins
    #[default]
    Auto,
    /// Always bin with an explicit bin size in pixels
    Fixed(u32),
}

impl BinningMode {
    /// Parse the textual forms accepted from the environment:
    /// `off`/`false`, `on`/`true`, `auto`, or a bin size in pixels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "false" => Some(BinningMode::Off),
            "on" | "true" => Some(BinningMode::On),
            "auto" => Some(BinningMode::Auto),
            other => match other.parse::<u32>() {
                Ok(0) => Some(BinningMode::Off),
                Ok(size) => Some(BinningMode::Fixed(size)),
                Err(_) => None,
            },
        }
    }
}

/// Full configuration of one heatmap feature instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default)]
    pub style: HeatmapStyle,

    #[serde(default)]
    pub binning: BinningMode,

    /// Quiet period after the last pan/zoom before a full rebuild
    #[serde(default = "default_update_delay_ms")]
    pub update_delay_ms: u64,

    /// Fixed lower intensity bound; computed from the data when absent
    #[serde(default)]
    pub min_intensity: Option<f64>,

    /// Fixed upper intensity bound; computed from the data when absent
    #[serde(default)]
    pub max_intensity: Option<f64>,
}

fn default_update_delay_ms() -> u64 {
    1000
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            style: HeatmapStyle::default(),
            binning: BinningMode::default(),
            update_delay_ms: default_update_delay_ms(),
            min_intensity: None,
            max_intensity: None,
        }
    }
}

impl HeatmapConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from environment variables, on top of defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HEATMAP_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.style.radius = radius;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_BLUR_RADIUS") {
            if let Ok(blur) = val.parse() {
                config.style.blur_radius = blur;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_GAUSSIAN") {
            config.style.gaussian = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("HEATMAP_BINNED") {
            if let Some(mode) = BinningMode::parse(&val) {
                config.binning = mode;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_UPDATE_DELAY_MS") {
            if let Ok(delay) = val.parse() {
                config.update_delay_ms = delay;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HeatmapResult<()> {
        self.style.validate()?;
        if self.binning == BinningMode::Fixed(0) {
            return Err(HeatmapError::config("explicit bin size must be >= 1"));
        }
        if let (Some(min), Some(max)) = (self.min_intensity, self.max_intensity) {
            if min > max {
                return Err(HeatmapError::config(format!(
                    "min_intensity {} exceeds max_intensity {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }
}

//! Point-density heatmap rendering.
//!
//! Turns weighted, positioned samples into a colored density raster:
//! - Kernel (stamp) construction: blurred disc or Gaussian profile
//! - Direct accumulation: one stamp per point
//! - Binned accumulation: one stamp per screen bin for large point counts
//! - Gradient lookup table and colorization of the accumulated alpha
//! - Cheap pan/zoom transforms with a debounced full rebuild

pub mod binning;
pub mod colorize;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod gradient;
pub mod kernel;
pub mod points;
pub mod projection;
pub mod style;
pub mod surface;
pub mod timer;
pub mod viewport;

pub use binning::{BinGrid, BinKey, BinnedAccumulator};
pub use colorize::Colorizer;
pub use error::{HeatmapError, HeatmapResult};
pub use feature::{BuildReport, HeatmapFeature, RenderContext, RenderOutcome, RenderableFeature};
pub use geometry::{DataPoint, HeatPoint, IntensityRange, ScreenPoint, WorldPoint};
pub use gradient::{GradientLut, LutCache};
pub use kernel::{Kernel, KernelCache, KernelKey};
pub use projection::{PlanarView, ViewProjection};
pub use style::{BinningMode, ColorStop, HeatmapConfig, HeatmapStyle, RgbaSpec};
pub use surface::{PixmapSurface, PresentationTransform, RasterSurface};
pub use timer::{Debouncer, ManualTimers, TimerHandle, TimerService};
pub use viewport::{ViewChange, ViewportTransformCache};

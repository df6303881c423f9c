//! Heatmap feature: owns render state and decides between a full rebuild and
//! a cheap view transform.
//!
//! Host collaborators (surface, projection, timers) are passed in per call
//! through [`RenderContext`]; the feature never stores them.

use tracing::{debug, info};

use crate::binning::{choose_bin_size, BinnedAccumulator};
use crate::colorize::Colorizer;
use crate::error::HeatmapResult;
use crate::geometry::{DataPoint, HeatPoint, IntensityRange};
use crate::gradient::LutCache;
use crate::kernel::KernelCache;
use crate::points::{accumulate_points, AccumulationStats};
use crate::projection::ViewProjection;
use crate::style::{HeatmapConfig, HeatmapStyle};
use crate::surface::{PresentationTransform, RasterSurface};
use crate::timer::{TimerHandle, TimerService};
use crate::viewport::{ViewChange, ViewportTransformCache};

/// Host services available for one call.
pub struct RenderContext<'a> {
    pub surface: &'a mut dyn RasterSurface,
    pub view: &'a dyn ViewProjection,
    pub timers: &'a mut dyn TimerService,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        surface: &'a mut dyn RasterSurface,
        view: &'a dyn ViewProjection,
        timers: &'a mut dyn TimerService,
    ) -> Self {
        Self {
            surface,
            view,
            timers,
        }
    }
}

/// Lifecycle of a drawable layer feature.
pub trait RenderableFeature {
    /// Rebuild the raster from scratch.
    fn build(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<BuildReport>;

    /// Rebuild if anything changed since the last build, otherwise keep the
    /// current raster.
    fn update(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<RenderOutcome>;

    /// Release cached resources and cancel pending timers.
    fn teardown(&mut self, timers: &mut dyn TimerService);
}

/// Summary of one full build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Points supplied
    pub points: usize,
    /// Points dropped because they projected to a non-finite position
    pub unprojectable: usize,
    pub accumulation: AccumulationStats,
    /// Bin size used, `None` for direct stamping
    pub bin_size: Option<u32>,
    pub intensity: IntensityRange,
    /// Pixels recolored through the gradient
    pub colored_pixels: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rebuilt(BuildReport),
    /// Nothing changed; the current raster (and any view transform) stands
    Reused,
}

/// Heatmap layer state.
#[derive(Debug)]
pub struct HeatmapFeature {
    config: HeatmapConfig,
    points: Vec<HeatPoint>,
    projected: Vec<DataPoint>,
    kernels: KernelCache,
    luts: LutCache,
    colorizer: Colorizer,
    viewport: ViewportTransformCache,
    /// Bumped on every data/style change or fired rebuild
    modified: u64,
    /// Value of `modified` at the last successful build
    built_at: Option<u64>,
    last_bin_size: Option<u32>,
}

impl HeatmapFeature {
    pub fn new(config: HeatmapConfig) -> HeatmapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            points: Vec::new(),
            projected: Vec::new(),
            kernels: KernelCache::new(),
            luts: LutCache::new(),
            colorizer: Colorizer::new(),
            viewport: ViewportTransformCache::new(),
            modified: 0,
            built_at: None,
            last_bin_size: None,
        })
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HeatmapConfig) -> HeatmapResult<()> {
        config.validate()?;
        self.config = config;
        self.mark_modified();
        Ok(())
    }

    pub fn set_style(&mut self, style: HeatmapStyle) -> HeatmapResult<()> {
        style.validate()?;
        self.config.style = style;
        self.mark_modified();
        Ok(())
    }

    pub fn set_data<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = HeatPoint>,
    {
        self.points.clear();
        self.points.extend(points);
        self.mark_modified();
    }

    pub fn data(&self) -> &[HeatPoint] {
        &self.points
    }

    /// Intensity bounds for the next build: configured overrides, otherwise
    /// the data's own extremes.
    ///
    /// A computed bound never crosses a configured one, so with only
    /// `min_intensity` set, data at or below it still normalizes to `<= 0`.
    pub fn intensity_range(&self) -> IntensityRange {
        let computed = || IntensityRange::from_values(self.points.iter().map(|p| p.intensity));
        match (self.config.min_intensity, self.config.max_intensity) {
            (Some(min), Some(max)) => IntensityRange::new(min, max),
            (Some(min), None) => IntensityRange::new(min, computed().max.max(min)),
            (None, Some(max)) => IntensityRange::new(computed().min.min(max), max),
            (None, None) => computed(),
        }
    }

    pub fn needs_rebuild(&self) -> bool {
        self.built_at.map_or(true, |built| built < self.modified)
    }

    /// Bin size chosen by the last build, `None` if it stamped directly.
    pub fn last_bin_size(&self) -> Option<u32> {
        self.last_bin_size
    }

    pub fn kernel_cache(&self) -> &KernelCache {
        &self.kernels
    }

    pub fn lut_cache(&self) -> &LutCache {
        &self.luts
    }

    pub fn viewport_cache(&self) -> &ViewportTransformCache {
        &self.viewport
    }

    /// Redraw entry point; rebuilds only when needed.
    pub fn render(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<RenderOutcome> {
        self.update(ctx)
    }

    /// Pan/zoom hook: transform the existing raster and debounce a rebuild.
    pub fn on_view_change(&mut self, ctx: &mut RenderContext<'_>) -> ViewChange {
        let delay = self.config.update_delay();
        self.viewport
            .on_pan_or_zoom(ctx.view, &mut *ctx.surface, &mut *ctx.timers, delay)
    }

    /// Timer hook. Returns `true` when `handle` was the pending rebuild; the
    /// host should then call [`render`](Self::render).
    pub fn on_timer(&mut self, handle: TimerHandle) -> bool {
        if self.viewport.fire(handle) {
            self.mark_modified();
            true
        } else {
            false
        }
    }

    /// Run a pending debounced rebuild now instead of waiting for its timer.
    pub fn flush_pending(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<Option<BuildReport>> {
        if !self.viewport.flush(&mut *ctx.timers) {
            return Ok(None);
        }
        self.mark_modified();
        self.build(ctx).map(Some)
    }

    fn mark_modified(&mut self) {
        self.modified += 1;
    }
}

/// Project world points to screen space, dropping non-finite results.
fn project_points(view: &dyn ViewProjection, points: &[HeatPoint], out: &mut Vec<DataPoint>) -> usize {
    out.clear();
    out.reserve(points.len());
    let mut dropped = 0;
    for point in points {
        match DataPoint::projected(view.world_to_screen(point.position), point.intensity) {
            Ok(projected) => out.push(projected),
            Err(_) => dropped += 1,
        }
    }
    dropped
}

impl RenderableFeature for HeatmapFeature {
    fn build(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<BuildReport> {
        let (width, height) = ctx.view.viewport_size();
        let range = self.intensity_range();
        let style = &self.config.style;
        let radius_sum = style.radius_sum() as f64;

        ctx.surface.allocate(width, height)?;
        ctx.surface.clear();
        ctx.surface.apply_presentation_transform(PresentationTransform::IDENTITY);

        let kernel = self.kernels.get_or_build(style.kernel_key())?;
        let lut = self.luts.get_or_build(&style.color_stops)?;

        let unprojectable = project_points(ctx.view, &self.points, &mut self.projected);

        let bin_size = choose_bin_size(self.config.binning, radius_sum, (width, height), self.points.len());
        let accumulation = match bin_size {
            None => accumulate_points(&mut *ctx.surface, kernel, &self.projected, range),
            Some(size) => BinnedAccumulator::new(size).accumulate(
                &mut *ctx.surface,
                kernel,
                &self.projected,
                range,
                radius_sum,
            ),
        };

        let colored_pixels = self.colorizer.colorize(&mut *ctx.surface, lut)?;

        self.viewport.on_full_rebuild(ctx.view, &mut *ctx.timers);
        self.last_bin_size = bin_size;
        self.built_at = Some(self.modified);

        let report = BuildReport {
            points: self.points.len(),
            unprojectable,
            accumulation,
            bin_size,
            intensity: range,
            colored_pixels,
        };
        debug!(
            points = report.points,
            stamped = report.accumulation.stamped,
            skipped = report.accumulation.skipped + report.unprojectable,
            bin_size = ?report.bin_size,
            colored_pixels,
            width,
            height,
            "Heatmap rebuilt"
        );
        Ok(report)
    }

    fn update(&mut self, ctx: &mut RenderContext<'_>) -> HeatmapResult<RenderOutcome> {
        if !self.needs_rebuild() {
            return Ok(RenderOutcome::Reused);
        }
        self.build(ctx).map(RenderOutcome::Rebuilt)
    }

    fn teardown(&mut self, timers: &mut dyn TimerService) {
        self.viewport.teardown(timers);
        self.kernels.invalidate();
        self.luts.invalidate();
        self.colorizer.release();
        self.projected = Vec::new();
        self.built_at = None;
        info!(points = self.points.len(), "Heatmap feature torn down");
    }
}

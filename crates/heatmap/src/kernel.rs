//! Point footprint ("stamp") construction.
//!
//! A kernel is a square, alpha-only image of side `2 * ceil(radius + blur)`
//! that is drawn once per point (or per bin). Two shapes are supported:
//!
//! - **Disc**: a filled circle of `radius`, softened by a Gaussian blur with
//!   sigma `blur / 2` (the usual shadow-blur convention).
//! - **Gaussian**: a radial gradient through [`GAUSSIAN_PROFILE`], an 11-sample
//!   piecewise-linear approximation of `exp(-r² / 2σ²)` with `σ = 0.3 · r2`.
//!   Ten intervals keep the error under 0.5% of peak, which is already below
//!   the error from truncating the Gaussian at the kernel edge.
//!
//! Kernels are cached by [`KernelKey`] and rebuilt only when it changes.

use image::GrayImage;
use tiny_skia::{
    Color, FillRule, GradientStop, Paint, PathBuilder, Pixmap, PixmapRef, Point, RadialGradient,
    Rect, SpreadMode, Transform,
};
use tracing::debug;

use crate::error::{HeatmapError, HeatmapResult};

/// Largest supported `radius + blur_radius`, in pixels. Kernel images are
/// square, so this bounds one stamp at 8192 x 8192 pixels.
pub const MAX_RADIUS_SUM: f32 = 4096.0;

/// Alpha at normalized radii `0.0, 0.1, ..., 1.0`.
pub const GAUSSIAN_PROFILE: [f32; 11] = [
    1.000, 0.946, 0.801, 0.607, 0.411, 0.249, 0.135, 0.066, 0.029, 0.011, 0.000,
];

/// Parameters that fully determine a kernel image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelKey {
    pub radius: f32,
    pub blur_radius: f32,
    pub gaussian: bool,
}

impl KernelKey {
    pub fn radius_sum(&self) -> f32 {
        self.radius + self.blur_radius
    }
}

/// A prebuilt stamp image.
#[derive(Debug, Clone)]
pub struct Kernel {
    key: KernelKey,
    half_extent: u32,
    /// `None` when the footprint is empty (zero radius and blur).
    pixmap: Option<Pixmap>,
}

impl Kernel {
    pub fn build(key: KernelKey) -> HeatmapResult<Self> {
        if !key.radius.is_finite() || key.radius < 0.0 {
            return Err(HeatmapError::config(format!("kernel radius {} is invalid", key.radius)));
        }
        if !key.blur_radius.is_finite() || key.blur_radius < 0.0 {
            return Err(HeatmapError::config(format!(
                "kernel blur radius {} is invalid",
                key.blur_radius
            )));
        }

        let radius_sum = key.radius_sum();
        if radius_sum > MAX_RADIUS_SUM {
            return Err(HeatmapError::config(format!(
                "kernel radius + blur radius {} exceeds {}",
                radius_sum, MAX_RADIUS_SUM
            )));
        }

        let half_extent = radius_sum.ceil() as u32;
        let side = half_extent * 2;
        let Some(mut pixmap) = Pixmap::new(side, side) else {
            return Ok(Self {
                key,
                half_extent,
                pixmap: None,
            });
        };

        if key.gaussian {
            draw_gaussian(&mut pixmap, half_extent as f32, key.radius_sum())?;
        } else {
            draw_blurred_disc(&mut pixmap, half_extent as f32, key.radius, key.blur_radius);
        }

        debug!(
            radius = key.radius,
            blur_radius = key.blur_radius,
            gaussian = key.gaussian,
            side,
            "Built heatmap kernel"
        );

        Ok(Self {
            key,
            half_extent,
            pixmap: Some(pixmap),
        })
    }

    pub fn key(&self) -> KernelKey {
        self.key
    }

    /// Side length in pixels; always even.
    pub fn side(&self) -> u32 {
        self.half_extent * 2
    }

    /// Distance from the kernel's top-left corner to its center.
    pub fn half_extent(&self) -> f64 {
        self.half_extent as f64
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    pub fn pixmap(&self) -> Option<PixmapRef<'_>> {
        self.pixmap.as_ref().map(|p| p.as_ref())
    }

    /// Alpha value at a kernel pixel, 0 outside the image.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixmap
            .as_ref()
            .and_then(|p| p.pixel(x, y))
            .map(|px| px.alpha())
            .unwrap_or(0)
    }
}

fn draw_gaussian(pixmap: &mut Pixmap, center: f32, radius: f32) -> HeatmapResult<()> {
    let last = (GAUSSIAN_PROFILE.len() - 1) as f32;
    let stops = GAUSSIAN_PROFILE
        .iter()
        .enumerate()
        .map(|(i, &alpha)| {
            let mut color = Color::BLACK;
            color.set_alpha(alpha);
            GradientStop::new(i as f32 / last, color)
        })
        .collect();

    let center_pt = Point::from_xy(center, center);
    let shader = RadialGradient::new(
        center_pt,
        center_pt,
        radius,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
    .ok_or_else(|| HeatmapError::config(format!("cannot build gaussian profile of radius {}", radius)))?;

    let mut paint = Paint::default();
    paint.shader = shader;
    paint.anti_alias = false;

    let side = pixmap.width() as f32;
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, side, side) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
    Ok(())
}

fn draw_blurred_disc(pixmap: &mut Pixmap, center: f32, radius: f32, blur: f32) {
    if let Some(path) = PathBuilder::from_circle(center, center, radius) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    if blur <= 0.0 {
        return;
    }

    let side = pixmap.width();
    let alpha: Vec<u8> = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
    let Some(mask) = GrayImage::from_raw(side, side, alpha) else {
        return;
    };
    let blurred = imageproc::filter::gaussian_blur_f32(&mask, blur / 2.0);

    // Premultiplied black: only the alpha byte carries information.
    for (px, a) in pixmap.data_mut().chunks_exact_mut(4).zip(blurred.as_raw()) {
        px.copy_from_slice(&[0, 0, 0, *a]);
    }
}

/// Single-entry kernel cache with an explicit get-or-build contract.
#[derive(Debug, Default)]
pub struct KernelCache {
    cached: Option<Kernel>,
    builds: u64,
}

impl KernelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached kernel if its key matches, otherwise rebuild it.
    pub fn get_or_build(&mut self, key: KernelKey) -> HeatmapResult<&Kernel> {
        let kernel = match self.cached.take() {
            Some(kernel) if kernel.key == key => kernel,
            _ => {
                self.builds += 1;
                Kernel::build(key)?
            }
        };
        Ok(self.cached.insert(kernel))
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of kernel images built over the cache's lifetime.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn current(&self) -> Option<&Kernel> {
        self.cached.as_ref()
    }
}

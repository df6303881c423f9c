//! Raster surface contract and a software implementation on tiny-skia.
//!
//! The heatmap core never owns the surface it draws into. It needs only the
//! operations in [`RasterSurface`]: (re)allocate, clear, stamp a kernel with
//! an opacity multiplier, read back and write straight-alpha RGBA pixels, and
//! set a view-only presentation transform.

use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform,
};

use crate::error::{HeatmapError, HeatmapResult};
use crate::geometry::ScreenPoint;
use crate::kernel::Kernel;

/// Affine presentation transform: translate, then uniform scale, then rotate,
/// all about the raster's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationTransform {
    pub translate: ScreenPoint,
    pub scale: f64,
    /// Rotation in radians
    pub rotation: f64,
}

impl PresentationTransform {
    pub const IDENTITY: PresentationTransform = PresentationTransform {
        translate: ScreenPoint::ORIGIN,
        scale: 1.0,
        rotation: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn to_skia(&self) -> Transform {
        Transform::from_translate(self.translate.x as f32, self.translate.y as f32)
            .pre_scale(self.scale as f32, self.scale as f32)
            .pre_concat(Transform::from_rotate(self.rotation.to_degrees() as f32))
    }

    /// Where a raster pixel ends up on screen under this transform.
    pub fn apply(&self, point: ScreenPoint) -> ScreenPoint {
        let (sin, cos) = self.rotation.sin_cos();
        let rx = point.x * cos - point.y * sin;
        let ry = point.x * sin + point.y * cos;
        ScreenPoint::new(
            self.translate.x + rx * self.scale,
            self.translate.y + ry * self.scale,
        )
    }
}

impl Default for PresentationTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Drawing capabilities the heatmap needs from its host.
pub trait RasterSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Make the surface `width × height`, reusing the current buffer when the
    /// size is unchanged. Contents are unspecified until [`clear`](Self::clear).
    fn allocate(&mut self, width: u32, height: u32) -> HeatmapResult<()>;

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Composite `kernel` with its top-left corner at `(x, y)`, scaling the
    /// kernel's alpha by `opacity` (source-over).
    fn stamp_kernel(&mut self, kernel: &Kernel, x: f64, y: f64, opacity: f32);

    /// Read straight-alpha RGBA bytes into `out`, resizing it as needed.
    fn read_pixels(&self, out: &mut Vec<u8>);

    /// Replace the contents with straight-alpha RGBA bytes.
    fn write_pixels(&mut self, pixels: &[u8]) -> HeatmapResult<()>;

    /// Set the view-only transform; pixel data is left untouched.
    fn apply_presentation_transform(&mut self, transform: PresentationTransform);
}

/// In-memory [`RasterSurface`] backed by a premultiplied tiny-skia pixmap.
///
/// Storage is premultiplied, so [`write_pixels`](RasterSurface::write_pixels)
/// followed by [`read_pixels`](RasterSurface::read_pixels) returns alpha
/// exactly but quantizes the color channels of translucent pixels; the lower
/// the alpha, the coarser the color.
#[derive(Debug, Default)]
pub struct PixmapSurface {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    presentation: PresentationTransform,
    stamps: u64,
}

impl PixmapSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u32, height: u32) -> HeatmapResult<Self> {
        let mut surface = Self::new();
        surface.allocate(width, height)?;
        Ok(surface)
    }

    /// The backing pixmap; `None` for a zero-area surface.
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn presentation(&self) -> PresentationTransform {
        self.presentation
    }

    /// Number of kernel stamps drawn since the last clear.
    pub fn stamp_count(&self) -> u64 {
        self.stamps
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixmap
            .as_ref()
            .and_then(|p| p.pixel(x, y))
            .map(|px| px.alpha())
            .unwrap_or(0)
    }

    /// Straight-alpha color of one pixel.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    /// Draw the raster onto `target` through the presentation transform.
    pub fn present(&self, target: &mut Pixmap) {
        if let Some(source) = &self.pixmap {
            target.draw_pixmap(
                0,
                0,
                source.as_ref(),
                &PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                },
                self.presentation.to_skia(),
                None,
            );
        }
    }
}

impl RasterSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn allocate(&mut self, width: u32, height: u32) -> HeatmapResult<()> {
        if self.width == width && self.height == height {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        if width == 0 || height == 0 {
            self.pixmap = None;
            return Ok(());
        }
        self.pixmap = Some(Pixmap::new(width, height).ok_or_else(|| {
            HeatmapError::Surface(format!("cannot allocate {}x{} raster", width, height))
        })?);
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(Color::TRANSPARENT);
        }
        self.stamps = 0;
    }

    fn stamp_kernel(&mut self, kernel: &Kernel, x: f64, y: f64, opacity: f32) {
        let (Some(target), Some(source)) = (&mut self.pixmap, kernel.pixmap()) else {
            return;
        };
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        target.draw_pixmap(
            0,
            0,
            source,
            &paint,
            Transform::from_translate(x as f32, y as f32),
            None,
        );
        self.stamps += 1;
    }

    fn read_pixels(&self, out: &mut Vec<u8>) {
        out.clear();
        let Some(pixmap) = &self.pixmap else {
            return;
        };
        out.reserve(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
    }

    fn write_pixels(&mut self, pixels: &[u8]) -> HeatmapResult<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if pixels.len() != expected {
            return Err(HeatmapError::Surface(format!(
                "pixel buffer has {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }
        if let Some(pixmap) = &mut self.pixmap {
            for (dst, src) in pixmap.pixels_mut().iter_mut().zip(pixels.chunks_exact(4)) {
                *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
            }
        }
        Ok(())
    }

    fn apply_presentation_transform(&mut self, transform: PresentationTransform) {
        self.presentation = transform;
    }
}

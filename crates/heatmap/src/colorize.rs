//! Alpha-to-color remapping of the accumulated raster.
//!
//! After accumulation the raster's alpha channel holds density. Every pixel
//! with non-zero alpha `a` is replaced by `lut[a]`; fully transparent pixels
//! are left as they are. The pass is `O(pixels)` and independent of the point
//! count.

use rayon::prelude::*;

use crate::error::HeatmapResult;
use crate::gradient::GradientLut;
use crate::surface::RasterSurface;

/// Replace each non-transparent RGBA pixel in place with its LUT entry.
///
/// Returns the number of pixels recolored.
pub fn colorize_pixels(pixels: &mut [u8], lut: &GradientLut) -> usize {
    pixels
        .par_chunks_exact_mut(4)
        .map(|px| {
            let alpha = px[3];
            if alpha == 0 {
                return 0;
            }
            px.copy_from_slice(&lut.entry(alpha));
            1
        })
        .sum()
}

/// Colorizes a surface through a reusable readback buffer.
#[derive(Debug, Default)]
pub struct Colorizer {
    scratch: Vec<u8>,
}

impl Colorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the surface, remap it through `lut`, and write it back.
    pub fn colorize(&mut self, surface: &mut dyn RasterSurface, lut: &GradientLut) -> HeatmapResult<usize> {
        surface.read_pixels(&mut self.scratch);
        let colored = colorize_pixels(&mut self.scratch, lut);
        surface.write_pixels(&self.scratch)?;
        Ok(colored)
    }

    /// Capacity of the readback buffer, in bytes.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Free the readback buffer.
    pub fn release(&mut self) {
        self.scratch = Vec::new();
    }
}

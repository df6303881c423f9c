//! Helpers for the heatmap crate's unit tests, integration tests and benches.
//!
//! [`generators`] produces seeded point clouds, [`fixtures`] holds style and
//! config JSON plus common viewport sizes, and the two macros below compare
//! floats and RGBA pixels with a tolerance. Points are plain
//! `(x, y, intensity)` tuples, which keeps this crate free of a dependency on
//! `heatmap` itself.
//!
//! Add it as a path dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Panics unless `|left - right| <= epsilon`, comparing as `f64`.
///
/// ```ignore
/// assert_approx_eq!(kernel.half_extent(), 25.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if diff.is_nan() || diff > epsilon {
            panic!(
                "values differ by {:?} (allowed {:?}): left {:?}, right {:?}",
                diff, epsilon, left, right
            );
        }
    }};
}

/// Panics unless every channel of two RGBA pixels is within `tolerance`.
///
/// ```ignore
/// assert_rgba_approx_eq!([255, 0, 0, 254], [254, 0, 1, 255], 1);
/// ```
#[macro_export]
macro_rules! assert_rgba_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: [u8; 4] = $left;
        let right: [u8; 4] = $right;
        let tolerance: i32 = $tolerance as i32;
        for channel in 0..4 {
            let diff = (left[channel] as i32 - right[channel] as i32).abs();
            if diff > tolerance {
                panic!(
                    "pixels differ in channel {} by {} (allowed {}): left {:?}, right {:?}",
                    channel, diff, tolerance, left, right
                );
            }
        }
    }};
}

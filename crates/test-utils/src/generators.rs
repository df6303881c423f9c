//! Synthetic point clouds.
//!
//! All generators are deterministic for a given seed and return
//! `(x, y, intensity)` tuples in screen-like coordinates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A sample as `(x, y, intensity)`.
pub type RawPoint = (f64, f64, f64);

/// Points uniformly spread over `[0, width) × [0, height)` with intensities
/// in `[0, max_intensity)`.
///
/// # Example
///
/// ```
/// use test_utils::uniform_points;
///
/// let points = uniform_points(100, 50.0, 20.0, 10.0, 7);
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|&(x, y, _)| x < 50.0 && y < 20.0));
/// ```
pub fn uniform_points(count: usize, width: f64, height: f64, max_intensity: f64, seed: u64) -> Vec<RawPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (
                rng.gen_range(0.0..width),
                rng.gen_range(0.0..height),
                rng.gen_range(0.0..max_intensity),
            )
        })
        .collect()
}

/// Points clustered around `center` within `spread` pixels on each axis,
/// all with the same intensity.
pub fn clustered_points(count: usize, center: (f64, f64), spread: f64, intensity: f64, seed: u64) -> Vec<RawPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let dx = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
            let dy = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
            (center.0 + dx, center.1 + dy, intensity)
        })
        .collect()
}

/// A regular lattice of `cols × rows` points `spacing` pixels apart, starting
/// at `origin`, with intensity increasing along the row-major index.
///
/// # Example
///
/// ```
/// use test_utils::lattice_points;
///
/// let points = lattice_points(3, 2, 10.0, (5.0, 5.0));
/// assert_eq!(points.len(), 6);
/// assert_eq!(points[0], (5.0, 5.0, 1.0));
/// assert_eq!(points[4], (15.0, 15.0, 5.0));
/// ```
pub fn lattice_points(cols: usize, rows: usize, spacing: f64, origin: (f64, f64)) -> Vec<RawPoint> {
    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            points.push((
                origin.0 + col as f64 * spacing,
                origin.1 + row as f64 * spacing,
                (row * cols + col + 1) as f64,
            ));
        }
    }
    points
}

/// Shift every point by `(dx, dy)`, keeping intensities.
pub fn translate_points(points: &[RawPoint], dx: f64, dy: f64) -> Vec<RawPoint> {
    points.iter().map(|&(x, y, i)| (x + dx, y + dy, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_deterministic() {
        assert_eq!(uniform_points(20, 10.0, 10.0, 1.0, 3), uniform_points(20, 10.0, 10.0, 1.0, 3));
        assert_ne!(uniform_points(20, 10.0, 10.0, 1.0, 3), uniform_points(20, 10.0, 10.0, 1.0, 4));
    }

    #[test]
    fn test_cluster_stays_within_spread() {
        let points = clustered_points(500, (25.0, 25.0), 1.0, 2.0, 11);
        assert!(points
            .iter()
            .all(|&(x, y, i)| (x - 25.0).abs() <= 1.0 && (y - 25.0).abs() <= 1.0 && i == 2.0));
    }

    #[test]
    fn test_zero_spread_cluster() {
        let points = clustered_points(3, (4.0, 5.0), 0.0, 1.0, 0);
        assert!(points.iter().all(|&p| p == (4.0, 5.0, 1.0)));
    }

    #[test]
    fn test_translate() {
        let moved = translate_points(&[(1.0, 2.0, 3.0)], 0.5, -1.0);
        assert_eq!(moved, vec![(1.5, 1.0, 3.0)]);
    }
}

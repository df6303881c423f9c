//! Tests for spatial binning and bin size selection.

use heatmap::binning::{auto_bin_size, choose_bin_size, BinGrid, BinKey, BinnedAccumulator};
use heatmap::geometry::{DataPoint, IntensityRange, ScreenPoint};
use heatmap::kernel::{Kernel, KernelKey};
use heatmap::points::accumulate_points;
use heatmap::style::BinningMode;
use heatmap::surface::{PixmapSurface, RasterSurface};
use test_utils::{clustered_points, lattice_points, translate_points, uniform_points, viewports, RawPoint};

fn data_points(raw: &[RawPoint]) -> Vec<DataPoint> {
    raw.iter().map(|&(x, y, i)| DataPoint::new(x, y, i)).collect()
}

fn range_of(points: &[DataPoint]) -> IntensityRange {
    IntensityRange::from_values(points.iter().map(|p| p.intensity))
}

// ============================================================================
// Bin size selection tests
// ============================================================================

#[test]
fn test_dense_tiny_viewport_bins_automatically() {
    // Default style: radius 10 + blur 10
    let size = choose_bin_size(BinningMode::Auto, 20.0, viewports::TINY, 100_000);
    assert_eq!(size, Some(3));
}

#[test]
fn test_sparse_data_stamps_directly() {
    assert_eq!(choose_bin_size(BinningMode::Auto, 20.0, viewports::HD, 5_000), None);
}

#[test]
fn test_bin_size_grows_with_radius() {
    assert_eq!(auto_bin_size(20.0), 3);
    assert_eq!(auto_bin_size(40.0), 5);
    assert_eq!(auto_bin_size(100.0), 12);
    assert_eq!(choose_bin_size(BinningMode::On, 100.0, viewports::SMALL, 1), Some(12));
    assert_eq!(choose_bin_size(BinningMode::Fixed(7), 100.0, viewports::SMALL, 1), Some(7));
}

// ============================================================================
// BinGrid tests
// ============================================================================

#[test]
fn test_centroid_lies_inside_its_bin() {
    let (w, h) = viewports::SMALL;
    let raw = uniform_points(2_000, w as f64, h as f64, 10.0, 42);
    let points = data_points(&raw);
    let range = range_of(&points);

    let mut grid = BinGrid::new(4, 20.0, (w, h));
    for p in &points {
        grid.insert(p, range);
    }
    assert!(!grid.is_empty());

    for (key, bin) in grid.iter() {
        let (min, max) = grid.bin_bounds(*key);
        let c = bin.centroid();
        assert!(
            c.x >= min.x - 1e-9 && c.x <= max.x + 1e-9 && c.y >= min.y - 1e-9 && c.y <= max.y + 1e-9,
            "centroid {:?} outside bin {:?} bounds {:?}..{:?}",
            c,
            key,
            min,
            max
        );
        assert!(bin.opacity() > 0.0 && bin.opacity() <= 1.0);
    }
}

#[test]
fn test_grouping_is_stable_under_translation() {
    let raw = lattice_points(10, 10, 2.5, (1.5, 2.25));
    let shifted = translate_points(&raw, 37.25, 11.75);
    let range = IntensityRange::new(0.0, 100.0);

    let mut a = BinGrid::new(3, 20.0, viewports::SMALL);
    let mut b = BinGrid::new(3, 20.0, viewports::SMALL);

    let mut delta: Option<(i64, i64)> = None;
    for (p, q) in data_points(&raw).iter().zip(data_points(&shifted).iter()) {
        let ka = a.key_for(p.position).unwrap();
        let kb = b.key_for(q.position).unwrap();
        let d = (kb.row - ka.row, kb.col - ka.col);
        match delta {
            None => delta = Some(d),
            Some(expected) => assert_eq!(d, expected, "point {:?} changed bin grouping", p.position),
        }
        assert!(a.insert(p, range));
        assert!(b.insert(q, range));
    }

    assert_eq!(a.len(), b.len());
    let (dr, dc) = delta.unwrap();
    for (key, bin) in a.iter() {
        let moved = b
            .get(BinKey {
                row: key.row + dr,
                col: key.col + dc,
            })
            .unwrap();
        assert!((moved.weight - bin.weight).abs() < 1e-12);
        assert!((moved.intensity_mix - bin.intensity_mix).abs() < 1e-12);
    }
}

#[test]
fn test_grid_anchor_follows_first_point() {
    let mut grid = BinGrid::new(5, 10.0, viewports::SMALL);
    grid.key_for(ScreenPoint::new(f64::NAN, 3.0));
    assert!(grid.offset().is_none());
    grid.key_for(ScreenPoint::new(12.0, 7.5));
    let offset = grid.offset().unwrap();
    assert_eq!(offset, ScreenPoint::new(2.0, 2.5));
}

// ============================================================================
// BinnedAccumulator tests
// ============================================================================

#[test]
fn test_cluster_collapses_to_few_stamps() {
    let kernel = Kernel::build(KernelKey {
        radius: 10.0,
        blur_radius: 10.0,
        gaussian: true,
    })
    .unwrap();
    let (w, h) = viewports::TINY;
    let points = data_points(&clustered_points(10_000, (25.0, 25.0), 1.0, 1.0, 9));
    let range = IntensityRange::new(0.0, 1.0);

    let mut surface = PixmapSurface::with_size(w, h).unwrap();
    let stats = BinnedAccumulator::new(3).accumulate(&mut surface, &kernel, &points, range, 20.0);

    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.stamped, stats.bins);
    assert!(stats.bins <= 4, "cluster spread over {} bins", stats.bins);
    assert_eq!(surface.stamp_count(), stats.stamped as u64);
    assert!(surface.alpha_at(25, 25) > 200);
}

#[test]
fn test_binned_and_direct_agree_on_coverage() {
    let kernel = Kernel::build(KernelKey {
        radius: 6.0,
        blur_radius: 6.0,
        gaussian: true,
    })
    .unwrap();
    let (w, h) = viewports::SMALL;
    let points = data_points(&uniform_points(3_000, w as f64, h as f64, 1.0, 5));
    let range = range_of(&points);

    let mut direct = PixmapSurface::with_size(w, h).unwrap();
    accumulate_points(&mut direct, &kernel, &points, range);

    let mut binned = PixmapSurface::with_size(w, h).unwrap();
    let stats = BinnedAccumulator::new(3).accumulate(&mut binned, &kernel, &points, range, 12.0);
    assert!(stats.stamped < points.len());

    // Both renderings cover the interior of the viewport
    for (x, y) in [(20, 20), (64, 48), (100, 70)] {
        assert!(direct.alpha_at(x, y) > 0);
        assert!(binned.alpha_at(x, y) > 0);
    }
    assert_eq!(direct.width(), binned.width());
}

#[test]
fn test_single_bin_matches_direct_at_center() {
    let kernel = Kernel::build(KernelKey {
        radius: 10.0,
        blur_radius: 10.0,
        gaussian: true,
    })
    .unwrap();
    let points = data_points(&[(30.2, 30.1, 1.0), (30.6, 30.4, 1.0), (30.9, 30.8, 1.0)]);
    let range = IntensityRange::new(0.0, 1.0);

    let mut grid = BinGrid::new(3, 20.0, viewports::SMALL);
    for p in &points {
        assert!(grid.insert(p, range));
    }
    assert_eq!(grid.len(), 1);
    let (key, bin) = grid.iter().next().map(|(k, b)| (*k, *b)).unwrap();
    let (min, max) = grid.bin_bounds(key);
    let c = bin.centroid();
    assert!(c.x >= min.x && c.x < max.x && c.y >= min.y && c.y < max.y);

    let mut direct = PixmapSurface::with_size(64, 64).unwrap();
    accumulate_points(&mut direct, &kernel, &points, range);
    let mut binned = PixmapSurface::with_size(64, 64).unwrap();
    BinnedAccumulator::new(3).accumulate(&mut binned, &kernel, &points, range, 20.0);

    assert_eq!(binned.stamp_count(), 1);
    let (d, b) = (direct.alpha_at(30, 30) as i32, binned.alpha_at(30, 30) as i32);
    assert!((d - b).abs() <= 10, "direct {} binned {}", d, b);
}

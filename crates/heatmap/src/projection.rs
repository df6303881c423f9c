//! World/screen coordinate projection.
//!
//! Hosts normally bring their own projection; [`PlanarView`] is a simple
//! pan/zoom/rotate camera over a flat world for hosts that don't, and for
//! tests.

use crate::geometry::{ScreenPoint, WorldPoint};

/// Coordinate services provided by the host view.
pub trait ViewProjection {
    fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint;

    fn screen_to_world(&self, point: ScreenPoint) -> WorldPoint;

    /// Zoom level; each unit doubles the on-screen scale.
    fn zoom(&self) -> f64;

    /// View rotation in radians.
    fn rotation(&self) -> f64;

    /// Viewport size in pixels `(width, height)`.
    fn viewport_size(&self) -> (u32, u32);
}

/// Flat camera: `2^zoom` pixels per world unit, world Y pointing up, the
/// `center` world point shown in the middle of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarView {
    pub center: WorldPoint,
    pub zoom: f64,
    pub rotation: f64,
    pub width: u32,
    pub height: u32,
}

impl PlanarView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            center: WorldPoint::new(0.0, 0.0),
            zoom: 0.0,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn with_center(mut self, center: WorldPoint) -> Self {
        self.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Move the view so that rendered content shifts by `(dx, dy)` pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let mid = self.screen_center();
        self.center = self.screen_to_world(ScreenPoint::new(mid.x - dx, mid.y - dy));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn scale(&self) -> f64 {
        2f64.powf(self.zoom)
    }

    fn screen_center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

impl ViewProjection for PlanarView {
    fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint {
        let scale = self.scale();
        let dx = (point.x - self.center.x) * scale;
        let dy = -(point.y - self.center.y) * scale;
        let (sin, cos) = self.rotation.sin_cos();
        let mid = self.screen_center();
        ScreenPoint::new(mid.x + dx * cos - dy * sin, mid.y + dx * sin + dy * cos)
    }

    fn screen_to_world(&self, point: ScreenPoint) -> WorldPoint {
        let scale = self.scale();
        let mid = self.screen_center();
        let (sin, cos) = self.rotation.sin_cos();
        let rx = point.x - mid.x;
        let ry = point.y - mid.y;
        let dx = rx * cos + ry * sin;
        let dy = -rx * sin + ry * cos;
        WorldPoint::new(self.center.x + dx / scale, self.center.y - dy / scale)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_center_maps_to_middle() {
        let view = PlanarView::new(200, 100).with_center(WorldPoint::new(5.0, 5.0));
        let p = view.world_to_screen(WorldPoint::new(5.0, 5.0));
        assert!(close(p.x, 100.0) && close(p.y, 50.0));
    }

    #[test]
    fn test_round_trip_with_rotation() {
        let mut view = PlanarView::new(300, 200).with_zoom(1.5);
        view.set_rotation(0.7);
        let world = WorldPoint::new(-12.5, 40.25);
        let back = view.screen_to_world(view.world_to_screen(world));
        assert!(close(back.x, world.x) && close(back.y, world.y));
    }

    #[test]
    fn test_zoom_doubles_scale() {
        let view = PlanarView::new(100, 100).with_zoom(1.0);
        let p = view.world_to_screen(WorldPoint::new(10.0, 0.0));
        assert!(close(p.x, 70.0));
    }

    #[test]
    fn test_pan_shifts_content() {
        let mut view = PlanarView::new(100, 100);
        let world = WorldPoint::new(3.0, -4.0);
        let before = view.world_to_screen(world);
        view.pan_by(12.0, -7.0);
        let after = view.world_to_screen(world);
        assert!(close(after.x - before.x, 12.0));
        assert!(close(after.y - before.y, -7.0));
    }
}

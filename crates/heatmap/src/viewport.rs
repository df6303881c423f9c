//! Cheap pan/zoom handling between full rebuilds.
//!
//! A full rebuild records the *baseline* view. Each later pan/zoom expresses
//! the current view as drift from that baseline (scale, screen position of the
//! baseline origin, rotation delta) and applies it as a presentation transform
//! on the already rendered raster. A full rebuild is debounced until the view
//! settles, and skipped entirely if the view returns to (almost) the baseline.

use std::time::Duration;
use tracing::debug;

use crate::geometry::{ScreenPoint, WorldPoint};
use crate::projection::ViewProjection;
use crate::surface::{PresentationTransform, RasterSurface};
use crate::timer::{Debouncer, TimerHandle, TimerService};

/// View captured at the last full rebuild, plus the last transform applied.
///
/// Baseline fields are written only by [`ViewportTransformCache::on_full_rebuild`];
/// the `last_*` fields only by [`ViewportTransformCache::on_pan_or_zoom`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSnapshot {
    pub zoom: f64,
    pub origin_in_world: WorldPoint,
    pub rotation: f64,
    pub last_scale: Option<f64>,
    pub last_origin: ScreenPoint,
    pub last_rotation: Option<f64>,
}

/// Whether a cheap transform has been applied since the last rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Baseline,
    Transformed,
}

/// Result of a pan/zoom event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    /// Nothing built yet, or the view matches the last applied transform
    Unchanged,
    /// A new presentation transform was applied
    Transformed {
        transform: PresentationTransform,
        rebuild_scheduled: bool,
    },
}

#[derive(Debug, Default)]
pub struct ViewportTransformCache {
    snapshot: Option<ViewportSnapshot>,
    debouncer: Debouncer,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// True when the drift from baseline is visible enough to warrant a rebuild.
pub fn drift_is_significant(scale: f64, origin: ScreenPoint, rotation_delta: f64) -> bool {
    round_to(scale, 4) != 1.0
        || round_to(rotation_delta, 4) != 0.0
        || round_to(origin.x, 1) != 0.0
        || round_to(origin.y, 1) != 0.0
}

impl ViewportTransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&ViewportSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn state(&self) -> ViewState {
        match &self.snapshot {
            Some(s) if s.last_scale.is_some() => ViewState::Transformed,
            _ => ViewState::Baseline,
        }
    }

    pub fn rebuild_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Record the current view as the new baseline and drop any pending rebuild.
    pub fn on_full_rebuild(&mut self, view: &dyn ViewProjection, timers: &mut dyn TimerService) {
        self.debouncer.cancel(timers);
        self.snapshot = Some(ViewportSnapshot {
            zoom: view.zoom(),
            origin_in_world: view.screen_to_world(ScreenPoint::ORIGIN),
            rotation: view.rotation(),
            last_scale: None,
            last_origin: ScreenPoint::ORIGIN,
            last_rotation: None,
        });
    }

    /// Apply the view's drift from baseline as a presentation transform and
    /// (re)schedule or cancel the debounced rebuild.
    pub fn on_pan_or_zoom(
        &mut self,
        view: &dyn ViewProjection,
        surface: &mut dyn RasterSurface,
        timers: &mut dyn TimerService,
        delay: Duration,
    ) -> ViewChange {
        let Some(snapshot) = self.snapshot.as_mut() else {
            return ViewChange::Unchanged;
        };

        let scale = 2f64.powf(view.zoom() - snapshot.zoom);
        let origin = view.world_to_screen(snapshot.origin_in_world);
        let rotation = view.rotation();

        if snapshot.last_scale == Some(scale)
            && snapshot.last_origin == origin
            && snapshot.last_rotation == Some(rotation)
        {
            return ViewChange::Unchanged;
        }

        let rotation_delta = rotation - snapshot.rotation;
        let transform = PresentationTransform {
            translate: origin,
            scale,
            rotation: rotation_delta,
        };
        surface.apply_presentation_transform(transform);

        snapshot.last_scale = Some(scale);
        snapshot.last_origin = origin;
        snapshot.last_rotation = Some(rotation);

        let rebuild_scheduled = if drift_is_significant(scale, origin, rotation_delta) {
            self.debouncer.trigger(timers, delay)
        } else {
            self.debouncer.cancel(timers);
            false
        };

        debug!(
            scale,
            origin_x = origin.x,
            origin_y = origin.y,
            rotation_delta,
            rebuild_scheduled,
            "Applied heatmap view transform"
        );

        ViewChange::Transformed {
            transform,
            rebuild_scheduled,
        }
    }

    /// Acknowledge a fired timer; `true` if it is the pending rebuild.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        self.debouncer.fire(handle)
    }

    /// Cancel a pending rebuild, reporting whether one was pending.
    pub fn flush(&mut self, timers: &mut dyn TimerService) -> bool {
        self.debouncer.flush(timers)
    }

    pub fn teardown(&mut self, timers: &mut dyn TimerService) {
        self.debouncer.cancel(timers);
        self.snapshot = None;
    }
}

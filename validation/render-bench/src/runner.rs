//! Benchmark execution.

use std::time::{Duration, Instant};

use heatmap::{
    HeatmapFeature, ManualTimers, PixmapSurface, PlanarView, RenderContext, RenderableFeature, ViewChange,
    WorldPoint,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics::{TimingCollector, TimingSummary};
use crate::scenario::BenchScenario;

/// Results of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchResults {
    pub scenario: String,
    pub width: u32,
    pub height: u32,
    pub points: usize,
    /// Bin size of the last build, `None` when stamping directly
    pub bin_size: Option<u32>,
    pub stamped: usize,
    pub colored_pixels: usize,
    pub build: TimingSummary,
    /// Present for pan runs
    #[serde(default)]
    pub transform: Option<TimingSummary>,
    /// Debounced rebuilds that fired during a pan run
    #[serde(default)]
    pub rebuilds: usize,
}

pub struct BenchRunner {
    scenario: BenchScenario,
}

impl BenchRunner {
    pub fn new(scenario: BenchScenario) -> Self {
        Self { scenario }
    }

    fn view(&self) -> PlanarView {
        let (cx, cy) = self.scenario.view_center();
        PlanarView::new(self.scenario.width, self.scenario.height).with_center(WorldPoint::new(cx, cy))
    }

    fn feature(&self) -> anyhow::Result<HeatmapFeature> {
        let mut feature = HeatmapFeature::new(self.scenario.heatmap.clone())?;
        feature.set_data(self.scenario.generate_points());
        Ok(feature)
    }

    /// Time repeated full builds of the same data.
    pub fn run_build(&self) -> anyhow::Result<BenchResults> {
        let view = self.view();
        let mut surface = PixmapSurface::new();
        let mut timers = ManualTimers::new();
        let mut feature = self.feature()?;
        let mut timings = TimingCollector::new()?;

        info!(
            scenario = %self.scenario.name,
            points = self.scenario.points,
            iterations = self.scenario.iterations,
            "Starting build benchmark"
        );

        let mut last = None;
        for iteration in 0..self.scenario.iterations {
            let mut ctx = RenderContext::new(&mut surface, &view, &mut timers);
            let start = Instant::now();
            let report = feature.build(&mut ctx)?;
            timings.record(start.elapsed());
            debug!(iteration, stamped = report.accumulation.stamped, "Build complete");
            last = Some(report);
        }

        let (bin_size, stamped, colored_pixels) = last
            .map(|r| (r.bin_size, r.accumulation.stamped, r.colored_pixels))
            .unwrap_or_default();

        Ok(BenchResults {
            scenario: self.scenario.name.clone(),
            width: self.scenario.width,
            height: self.scenario.height,
            points: self.scenario.points,
            bin_size,
            stamped,
            colored_pixels,
            build: timings.summary(),
            transform: None,
            rebuilds: 0,
        })
    }

    /// Simulate a drag: pan step by step on a virtual clock that advances
    /// faster than the rebuild delay only every few steps, timing the cheap
    /// transforms and the debounced rebuilds separately.
    pub fn run_pan(&self) -> anyhow::Result<BenchResults> {
        let mut view = self.view();
        let mut surface = PixmapSurface::new();
        let mut timers = ManualTimers::new();
        let mut feature = self.feature()?;
        let mut builds = TimingCollector::new()?;
        let mut transforms = TimingCollector::new()?;

        let delay = feature.config().update_delay();
        // Pause long enough for the rebuild to fire every tenth step
        let step_pause = delay / 4;
        let settle_pause = delay + Duration::from_millis(1);

        info!(
            scenario = %self.scenario.name,
            points = self.scenario.points,
            steps = self.scenario.pan_steps,
            "Starting pan benchmark"
        );

        let mut last = {
            let mut ctx = RenderContext::new(&mut surface, &view, &mut timers);
            let start = Instant::now();
            let report = feature.build(&mut ctx)?;
            builds.record(start.elapsed());
            report
        };

        let mut rebuilds = 0;
        for step in 0..self.scenario.pan_steps {
            view.pan_by(self.scenario.pan_step_px, self.scenario.pan_step_px / 2.0);

            {
                let mut ctx = RenderContext::new(&mut surface, &view, &mut timers);
                let start = Instant::now();
                let change = feature.on_view_change(&mut ctx);
                transforms.record(start.elapsed());
                if let ViewChange::Transformed { rebuild_scheduled, .. } = change {
                    debug!(step, rebuild_scheduled, "View transformed");
                }
            }

            let pause = if step % 10 == 9 { settle_pause } else { step_pause };
            for handle in timers.advance(pause) {
                if feature.on_timer(handle) {
                    let mut ctx = RenderContext::new(&mut surface, &view, &mut timers);
                    let start = Instant::now();
                    last = feature.build(&mut ctx)?;
                    builds.record(start.elapsed());
                    rebuilds += 1;
                }
            }
        }

        Ok(BenchResults {
            scenario: self.scenario.name.clone(),
            width: self.scenario.width,
            height: self.scenario.height,
            points: self.scenario.points,
            bin_size: last.bin_size,
            stamped: last.accumulation.stamped,
            colored_pixels: last.colored_pixels,
            build: builds.summary(),
            transform: Some(transforms.summary()),
            rebuilds,
        })
    }
}

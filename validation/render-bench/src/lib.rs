//! Rendering benchmarks for the heatmap core.
//!
//! This crate provides tools to:
//! - Generate synthetic point clouds from scenario files
//! - Time full builds (direct and binned) and pan/zoom transforms
//! - Output results as a console table or JSON

pub mod metrics;
pub mod report;
pub mod runner;
pub mod scenario;

pub use metrics::{TimingCollector, TimingSummary};
pub use report::ResultsReport;
pub use runner::{BenchResults, BenchRunner};
pub use scenario::{BenchScenario, PointDistribution};

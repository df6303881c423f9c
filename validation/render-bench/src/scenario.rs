//! Benchmark scenario loading.

use heatmap::{HeatPoint, HeatmapConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One benchmark scenario, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub points: usize,
    #[serde(default)]
    pub distribution: PointDistribution,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Pan steps simulated by the `pan` command
    #[serde(default = "default_pan_steps")]
    pub pan_steps: u32,
    #[serde(default = "default_pan_step_px")]
    pub pan_step_px: f64,
    #[serde(default)]
    pub seed: Option<u64>, // Optional RNG seed for reproducible runs
    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

fn default_iterations() -> u32 {
    10
}

fn default_pan_steps() -> u32 {
    30
}

fn default_pan_step_px() -> f64 {
    4.0
}

/// How synthetic points are spread over the viewport.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointDistribution {
    #[default]
    Uniform,
    Clustered {
        clusters: usize,
        /// Half-width of each cluster in pixels
        spread: f64,
    },
}

impl BenchScenario {
    /// Scenario built from command-line values.
    pub fn quick(width: u32, height: u32, points: usize, iterations: u32) -> Self {
        Self {
            name: "quick".to_string(),
            description: "Uniform points with default styling".to_string(),
            width,
            height,
            points,
            distribution: PointDistribution::Uniform,
            iterations,
            pan_steps: default_pan_steps(),
            pan_step_px: default_pan_step_px(),
            seed: None,
            heatmap: HeatmapConfig::from_env(),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario: BenchScenario = serde_json::from_str(&content)?;
        Ok(scenario)
    }

    /// Validate the scenario.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("viewport must be at least 1x1, got {}x{}", self.width, self.height);
        }
        if self.iterations == 0 {
            anyhow::bail!("iterations must be > 0");
        }
        if let PointDistribution::Clustered { clusters, spread } = &self.distribution {
            if *clusters == 0 {
                anyhow::bail!("clustered distribution needs at least one cluster");
            }
            if !(spread.is_finite() && *spread >= 0.0) {
                anyhow::bail!("cluster spread must be >= 0");
            }
        }
        self.heatmap.validate()?;
        Ok(())
    }

    /// Generate the scenario's points in world coordinates.
    ///
    /// Points are laid out in screen pixels and mapped to a world in which
    /// `(x, -y)` lands on pixel `(x, y)`; see [`BenchScenario::view_center`].
    pub fn generate_points(&self) -> Vec<HeatPoint> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (w, h) = (self.width as f64, self.height as f64);

        match &self.distribution {
            PointDistribution::Uniform => (0..self.points)
                .map(|_| {
                    HeatPoint::new(rng.gen_range(0.0..w), -rng.gen_range(0.0..h), rng.gen_range(0.0..1.0))
                })
                .collect(),
            PointDistribution::Clustered { clusters, spread } => {
                let centers: Vec<(f64, f64)> = (0..(*clusters).max(1))
                    .map(|_| (rng.gen_range(0.0..w), rng.gen_range(0.0..h)))
                    .collect();
                (0..self.points)
                    .map(|i| {
                        let (cx, cy) = centers[i % centers.len()];
                        let dx = if *spread > 0.0 { rng.gen_range(-spread..*spread) } else { 0.0 };
                        let dy = if *spread > 0.0 { rng.gen_range(-spread..*spread) } else { 0.0 };
                        HeatPoint::new(cx + dx, -(cy + dy), rng.gen_range(0.0..1.0))
                    })
                    .collect()
            }
        }
    }

    /// World point shown at the viewport center.
    pub fn view_center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, -(self.height as f64) / 2.0)
    }
}

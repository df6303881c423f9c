//! Error types for heatmap rendering.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap operations.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // === Data Errors ===
    /// A point projected to a non-finite screen position. Accumulators drop
    /// these silently; they never escape a build.
    #[error("Point projected to non-finite position ({x}, {y})")]
    SkippablePoint { x: f64, y: f64 },

    // === Host Errors ===
    #[error("Timer service error: {0}")]
    Timer(String),

    #[error("Raster surface error: {0}")]
    Surface(String),
}

impl HeatmapError {
    /// Whether the error only excludes a single point from accumulation.
    pub fn is_skippable(&self) -> bool {
        matches!(self, HeatmapError::SkippablePoint { .. })
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        HeatmapError::Configuration(message.into())
    }
}

impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::Configuration(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::Configuration(format!("JSON error: {}", err))
    }
}

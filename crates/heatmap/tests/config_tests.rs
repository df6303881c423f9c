//! Tests for heatmap configuration loading and validation.

use std::time::Duration;

use heatmap::error::HeatmapError;
use heatmap::feature::HeatmapFeature;
use heatmap::style::{BinningMode, HeatmapConfig};
use test_utils::styles;

// ============================================================================
// JSON loading tests
// ============================================================================

#[test]
fn test_auto_binned_config() {
    let config = HeatmapConfig::from_json(styles::AUTO_BINNED_CONFIG).unwrap();
    assert_eq!(config.binning, BinningMode::Auto);
    assert_eq!(config.update_delay(), Duration::from_millis(250));
    assert!(config.style.gaussian);
    // Stops fall back to the default gradient
    assert_eq!(config.style.color_stops.len(), 5);
}

#[test]
fn test_fixed_bin_config() {
    let config = HeatmapConfig::from_json(styles::FIXED_BIN_CONFIG).unwrap();
    assert_eq!(config.binning, BinningMode::Fixed(6));
    assert_eq!(config.min_intensity, Some(0.0));
    assert_eq!(config.max_intensity, Some(50.0));
    assert_eq!(config.update_delay_ms, 1000);
}

#[test]
fn test_missing_alpha_is_configuration_error() {
    let err = HeatmapConfig::from_json(styles::MISSING_ALPHA_STOP).unwrap_err();
    assert!(matches!(err, HeatmapError::Configuration(_)));
    assert!(err.to_string().contains("'a'"), "unexpected error: {}", err);
}

#[test]
fn test_malformed_json_is_configuration_error() {
    let err = HeatmapConfig::from_json("{ \"style\": ").unwrap_err();
    assert!(matches!(err, HeatmapError::Configuration(_)));
}

#[test]
fn test_inverted_intensity_bounds_rejected() {
    let err = HeatmapConfig::from_json(r#"{ "min_intensity": 5.0, "max_intensity": 1.0 }"#).unwrap_err();
    assert!(err.to_string().contains("min_intensity"));
}

#[test]
fn test_zero_fixed_bin_rejected() {
    assert!(HeatmapConfig::from_json(r#"{ "binning": { "fixed": 0 } }"#).is_err());
    let config = HeatmapConfig {
        binning: BinningMode::Fixed(0),
        ..HeatmapConfig::default()
    };
    assert!(HeatmapFeature::new(config).is_err());
}

#[test]
fn test_config_serializes_back() {
    let config = HeatmapConfig::from_json(styles::FIXED_BIN_CONFIG).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(HeatmapConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_missing_file_is_configuration_error() {
    let err = HeatmapConfig::from_file("/nonexistent/heatmap.json").unwrap_err();
    assert!(matches!(err, HeatmapError::Configuration(_)));
}

// ============================================================================
// Environment tests
// ============================================================================

// The only test in this binary touching HEATMAP_* variables.
#[test]
fn test_from_env_overrides_defaults() {
    std::env::set_var("HEATMAP_RADIUS", "6");
    std::env::set_var("HEATMAP_BLUR_RADIUS", "2.5");
    std::env::set_var("HEATMAP_GAUSSIAN", "false");
    std::env::set_var("HEATMAP_BINNED", "8");
    std::env::set_var("HEATMAP_UPDATE_DELAY_MS", "40");

    let config = HeatmapConfig::from_env();

    for var in [
        "HEATMAP_RADIUS",
        "HEATMAP_BLUR_RADIUS",
        "HEATMAP_GAUSSIAN",
        "HEATMAP_BINNED",
        "HEATMAP_UPDATE_DELAY_MS",
    ] {
        std::env::remove_var(var);
    }

    assert_eq!(config.style.radius, 6.0);
    assert_eq!(config.style.blur_radius, 2.5);
    assert!(!config.style.gaussian);
    assert_eq!(config.binning, BinningMode::Fixed(8));
    assert_eq!(config.update_delay_ms, 40);
    assert!(config.validate().is_ok());
}

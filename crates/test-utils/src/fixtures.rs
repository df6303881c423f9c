//! Common test fixtures for heatmap tests.

/// Style/config JSON documents.
pub mod styles {
    /// Blurred-disc style with a transparent-blue to opaque-red gradient.
    pub const BLUE_TO_RED_DISC: &str = r#"{
        "radius": 10,
        "blur_radius": 15,
        "gaussian": false,
        "color_stops": [
            { "offset": 0.0, "color": { "r": 0, "g": 0, "b": 1, "a": 0 } },
            { "offset": 1.0, "color": { "r": 1, "g": 0, "b": 0, "a": 1 } }
        ]
    }"#;

    /// Full feature configuration with automatic binning and a short delay.
    pub const AUTO_BINNED_CONFIG: &str = r#"{
        "style": {
            "radius": 10,
            "blur_radius": 10,
            "gaussian": true
        },
        "binning": "auto",
        "update_delay_ms": 250
    }"#;

    /// Configuration with an explicit bin size and fixed intensity bounds.
    pub const FIXED_BIN_CONFIG: &str = r#"{
        "binning": { "fixed": 6 },
        "min_intensity": 0.0,
        "max_intensity": 50.0
    }"#;

    /// A color stop missing its alpha channel.
    pub const MISSING_ALPHA_STOP: &str = r#"{
        "style": {
            "color_stops": [
                { "offset": 0.0, "color": { "r": 0, "g": 0, "b": 1, "a": 0 } },
                { "offset": 1.0, "color": { "r": 1, "g": 0, "b": 0 } }
            ]
        }
    }"#;
}

/// Viewport sizes used across tests.
pub mod viewports {
    /// Tiny viewport used for the dense-binning scenario
    pub const TINY: (u32, u32) = (50, 50);

    pub const SMALL: (u32, u32) = (128, 96);

    pub const HD: (u32, u32) = (1280, 720);
}

/// Center of a zoom-0, unrotated planar view in which world `(x, -y)` lands
/// on screen pixel `(x, y)` (world Y points up).
pub fn screen_aligned_center(width: u32, height: u32) -> (f64, f64) {
    (width as f64 / 2.0, -(height as f64) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_aligned_center() {
        assert_eq!(screen_aligned_center(100, 40), (50.0, -20.0));
    }
}

//! Results reporting and formatting.

use crate::metrics::TimingSummary;
use crate::runner::BenchResults;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Formats benchmark results for output.
pub struct ResultsReport;

fn timing_row(summary: &TimingSummary) -> String {
    format!(
        "{:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
        summary.mean_ms, summary.p50_ms, summary.p90_ms, summary.p99_ms, summary.max_ms
    )
}

impl ResultsReport {
    /// Format results as a console table.
    pub fn format_table(results: &BenchResults) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Heatmap Benchmark: {}", results.scenario)]);

        table.add_row(vec![
            "Viewport:",
            &format!("{}x{}", results.width, results.height),
        ]);
        table.add_row(vec!["Points:", &format!("{}", results.points)]);
        table.add_row(vec![
            "Bin Size:",
            &results
                .bin_size
                .map(|b| format!("{} px", b))
                .unwrap_or_else(|| "direct".to_string()),
        ]);
        table.add_row(vec!["Stamps:", &format!("{}", results.stamped)]);
        table.add_row(vec!["Colored Pixels:", &format!("{}", results.colored_pixels)]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Timing (ms)", "mean / p50 / p90 / p99 / max"]);
        table.add_row(vec![
            &format!("Build (n={})", results.build.count),
            &timing_row(&results.build),
        ]);
        if let Some(transform) = &results.transform {
            table.add_row(vec![
                &format!("Transform (n={})", transform.count),
                &timing_row(transform),
            ]);
            table.add_row(vec!["Debounced Rebuilds:", &format!("{}", results.rebuilds)]);
        }

        table.to_string()
    }

    /// Format results as JSON.
    pub fn format_json(results: &BenchResults) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> BenchResults {
        BenchResults {
            scenario: "unit".to_string(),
            width: 10,
            height: 20,
            points: 5,
            bin_size: Some(3),
            stamped: 4,
            colored_pixels: 100,
            build: TimingSummary {
                count: 1,
                mean_ms: 1.5,
                ..TimingSummary::default()
            },
            transform: None,
            rebuilds: 0,
        }
    }

    #[test]
    fn test_table_mentions_bin_size() {
        let table = ResultsReport::format_table(&results());
        assert!(table.contains("Heatmap Benchmark: unit"));
        assert!(table.contains("3 px"));
        assert!(!table.contains("Transform"));
    }

    #[test]
    fn test_json_round_trip() {
        let json = ResultsReport::format_json(&results()).unwrap();
        let parsed: BenchResults = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bin_size, Some(3));
        assert_eq!(parsed.build.mean_ms, 1.5);
    }
}

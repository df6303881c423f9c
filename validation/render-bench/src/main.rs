//! Benchmark CLI for heatmap rendering.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use render_bench::{BenchRunner, BenchScenario, BenchResults, ResultsReport};

#[derive(Parser)]
#[command(name = "render-bench")]
#[command(about = "Timing tool for heatmap builds and view transforms", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output format: table (default) or json
    #[arg(short, long, global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time full builds from a scenario file
    Run {
        /// Path to scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override iteration count
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Also simulate a pan gesture after the builds
        #[arg(long)]
        pan: bool,
    },

    /// Time full builds of uniform points with default styling
    Quick {
        /// Number of points
        #[arg(short, long, default_value = "10000")]
        points: usize,

        #[arg(long, default_value = "512")]
        width: u32,

        #[arg(long, default_value = "512")]
        height: u32,

        #[arg(short, long, default_value = "10")]
        iterations: u32,
    },

    /// Simulate a pan gesture with debounced rebuilds
    Pan {
        /// Path to scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the number of pan steps
        #[arg(long)]
        steps: Option<u32>,
    },
}

fn print_results(results: &BenchResults, output: &str) -> anyhow::Result<()> {
    match output {
        "json" => println!("{}", ResultsReport::format_json(results)?),
        _ => println!("{}", ResultsReport::format_table(results)),
    }
    Ok(())
}

fn load_scenario(path: &Path) -> anyhow::Result<BenchScenario> {
    info!(path = %path.display(), "Loading scenario");
    BenchScenario::from_file(path)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            scenario,
            iterations,
            pan,
        } => {
            let mut scenario = load_scenario(&scenario)?;
            if let Some(i) = iterations {
                scenario.iterations = i;
            }
            scenario.validate()?;

            let runner = BenchRunner::new(scenario);
            print_results(&runner.run_build()?, &cli.output)?;
            if pan {
                print_results(&runner.run_pan()?, &cli.output)?;
            }
        }
        Commands::Quick {
            points,
            width,
            height,
            iterations,
        } => {
            let scenario = BenchScenario::quick(width, height, points, iterations);
            scenario.validate()?;
            print_results(&BenchRunner::new(scenario).run_build()?, &cli.output)?;
        }
        Commands::Pan { scenario, steps } => {
            let mut scenario = load_scenario(&scenario)?;
            if let Some(s) = steps {
                scenario.pan_steps = s;
            }
            scenario.validate()?;
            print_results(&BenchRunner::new(scenario).run_pan()?, &cli.output)?;
        }
    }

    Ok(())
}

// src/main.rs
mod config;
mod engine;
mod errors;
mod file_utils;
mod inference_config;
mod models;
mod pipeline;
mod report;
mod results;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{DEFAULT_CONFIG_FILE, load_run_config};
use engine::{BridgeEngine, CommandInference};
use models::{NetworkType, PerformanceRecord, PlotConfig, RunPaths};
use report::{SummaryChart, SummaryViewer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "stneuro-eval",
    version,
    about = "Run trained neuron-segmentation networks on Layer175 data and score the results"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare data, run inference, postprocess and score every item
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
        /// Override the network type from the config file (ABO, ABO_Neuro, Neurofinder)
        #[arg(short, long)]
        network_type: Option<NetworkType>,
        /// Skip the interactive summary plot
        #[arg(long)]
        no_plot: bool,
    },
    /// Prepare data and write the inference config only
    Configure {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
        #[arg(short, long)]
        network_type: Option<NetworkType>,
    },
    /// Show the summary plot of a saved performance file
    Plot {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
        /// Performance file to read; defaults to the one in the test mask directory
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            network_type,
            no_plot,
        } => {
            let config = load_run_config(&config, network_type)?;
            info!(
                "Evaluating {} items with the {} network",
                config.general.names.len(),
                config.general.network_type
            );

            let engine = BridgeEngine::spawn(&config.engine)
                .context("Failed to start the numeric engine")?;
            let mut inference = CommandInference::from_config(&config.inference);
            let record = pipeline::run_pipeline(engine, &mut inference, &config)?;

            match record {
                Some(record) => show_summary(&record, &config.plot, !no_plot)?,
                None => info!("No ground truth configured, skipping scoring summary"),
            }
        }
        Commands::Configure {
            config,
            network_type,
        } => {
            let config = load_run_config(&config, network_type)?;
            let engine = BridgeEngine::spawn(&config.engine)
                .context("Failed to start the numeric engine")?;
            pipeline::configure_only(engine, &config)?;
        }
        Commands::Plot { config, input } => {
            let config = load_run_config(&config, None)?;
            let input = input.unwrap_or_else(|| RunPaths::new(&config).performance_file());
            let record = results::load_performance(&input)
                .with_context(|| format!("Failed to load performance file {}", input.display()))?;
            show_summary(&record, &config.plot, true)?;
        }
    }

    Ok(())
}

/// 打印汇总并按配置打开汇总图
fn show_summary(record: &PerformanceRecord, plot: &PlotConfig, interactive: bool) -> Result<()> {
    if record.is_empty() {
        info!("Performance record is empty, nothing to plot");
        return Ok(());
    }

    let chart = SummaryChart::new(record, plot);
    info!("Mean over {} items: {}", record.len(), chart.summary_line());

    if interactive && plot.enabled {
        let mut viewer = SummaryViewer::new(&plot.quit_key)?;
        viewer.run(&chart)?;
    }
    Ok(())
}

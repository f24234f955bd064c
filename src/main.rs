use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use coordination_common::{write_table, write_transport_report, AnalysisConfig, TableFormat};
use coordination_engine::aggregate_study;

/// Coordination number and local composition of electrolyte MD runs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the analysis config.toml
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Study directory containing the run directories (overrides study.directory)
    #[arg(long)]
    study_dir: Option<PathBuf>,

    /// Output table path (overrides output.path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: "csv" or "json" (overrides output.format)
    #[arg(long)]
    format: Option<String>,

    /// Number of worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    run_with_args(Args::parse())
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Starting Coordination Analysis...");

    // --- Load Configuration ---
    let mut config = AnalysisConfig::load(&args.config)?;
    if let Some(dir) = &args.study_dir {
        config.study.directory = dir.display().to_string();
    }
    if let Some(path) = &args.output {
        config.output.path = path.display().to_string();
    }
    if let Some(format) = &args.format {
        config.output.format = Some(format.clone());
    }
    config.validate()?;
    let params = config.get_analysis_params();
    debug!("Analysis Parameters: {:#?}", params);

    // --- Configure Rayon Thread Pool (Optional) ---
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    info!(
        "Target type {}, cutoff {}, {} references per frame, {} frames per run.",
        params.target_type,
        params.cutoff_radius,
        params.sample_size,
        params.frame_ids.len()
    );

    // --- Study ---
    let start_time = Instant::now();
    let study_dir = PathBuf::from(&config.study.directory);
    let table = aggregate_study(&study_dir, &params)
        .with_context(|| format!("Failed to analyze study '{}'", study_dir.display()))?;
    info!(
        "Analyzed {} runs in {:.3} seconds.",
        table.len(),
        start_time.elapsed().as_secs_f64()
    );
    if table.is_empty() {
        warn!("Study table is empty; writing an empty output.");
    }

    // --- Save Results ---
    let format = TableFormat::from_name(config.output.format.as_deref())?;
    write_table(&table, &config.output.path, format)?;
    info!("Study table saved to {} ({:?} format)", config.output.path, format);

    if let Some(transport_path) = &config.output.transport_path {
        write_transport_report(&table, transport_path)?;
        info!("Transport report saved to {}", transport_path);
    } else {
        debug!("No transport report requested.");
    }

    info!("Analysis Complete.");
    Ok(())
}

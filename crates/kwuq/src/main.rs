use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use jiff::Timestamp;
use kwuq::commands::{PropagateOptions, run_propagate, run_replicate, run_transform};
use kwuq::init_logging;
use kwuq::io::load_config;
use kwuq::manifest::default_run_dir;
use kwuq_core::qoi::QoiKind;

#[derive(Parser, Debug)]
#[command(name = "kwuq")]
#[command(about = "Parameter uncertainty propagation for the Keane & Wolpin model")]
struct Args {
    /// Path to the data directory (default: ~/.kwuq/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the mean parameters in simulator notation
    Transform {
        /// Run configuration (YAML)
        config: PathBuf,
        /// Write the parameters as JSON instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Propagate parameter uncertainty to the configured quantity of interest
    Propagate {
        /// Run configuration (YAML)
        config: PathBuf,
        /// Run directory (default: <data-dir>/runs/propagate-<timestamp>)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Override the number of draws
        #[arg(long)]
        draws: Option<usize>,
        /// Override the base seed
        #[arg(long)]
        seed: Option<u64>,
        /// Worker threads (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,
        /// Histogram bins for scalar quantities
        #[arg(long, default_value_t = 20)]
        bins: usize,
        /// Also write the parameters of every draw
        #[arg(long)]
        export_draws: bool,
    },
    /// Baseline against policy at the mean parameters
    Replicate {
        /// Run configuration (YAML)
        config: PathBuf,
        /// Run directory (default: <data-dir>/runs/replicate-<timestamp>)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kwuq")
}

impl Command {
    /// Run directory for commands that write one
    fn run_dir(&self, data_dir: &Path, created: Timestamp) -> Option<PathBuf> {
        let (name, output_dir) = match self {
            Command::Transform { .. } => return None,
            Command::Propagate { output_dir, .. } => ("propagate", output_dir),
            Command::Replicate { output_dir, .. } => ("replicate", output_dir),
        };
        Some(
            output_dir
                .clone()
                .unwrap_or_else(|| default_run_dir(data_dir, name, created)),
        )
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let created = Timestamp::now();
    let run_dir = args.command.run_dir(&data_dir, created);

    init_logging(&data_dir, &args.log_level, run_dir.as_deref())?;

    match (args.command, run_dir) {
        (Command::Transform { config, output }, _) => {
            let config = load_config(&config)?;
            let params = run_transform(&config, output.as_deref())?;
            if output.is_none() {
                for (param, value) in params.iter() {
                    println!("{:<40} {value}", param.to_string());
                }
            }
        }
        (
            Command::Propagate {
                config,
                draws,
                seed,
                workers,
                bins,
                export_draws,
                ..
            },
            Some(run_dir),
        ) => {
            let config = load_config(&config)?;
            let qoi = config.qoi;
            let options = PropagateOptions {
                draws,
                seed,
                workers,
                bins,
                export_draws,
            };

            let aggregate = run_propagate(config, &options, &run_dir, created)?;

            println!("Draws:     {}", aggregate.num_draws);
            println!("Seed:      {}", aggregate.seed);
            match qoi {
                QoiKind::EducationTable => {
                    println!("Mean, variance and deviation tables written to aggregate.json");
                }
                QoiKind::MeanEducation | QoiKind::VarianceRatio => {
                    let mean = aggregate.summary.mean().cells()[0];
                    let variance = aggregate.summary.variance().cells()[0];
                    println!("Mean:      {mean:.6}");
                    println!("Std dev:   {:.6}", variance.sqrt());
                    if let Some(deviation) = aggregate.deviation.and_then(|d| d.as_scalar()) {
                        println!("Deviation: {deviation:.6}");
                    }
                }
            }
            println!("Results:   {}", run_dir.display());
        }
        (Command::Replicate { config, .. }, Some(run_dir)) => {
            let config = load_config(&config)?;
            let report = run_replicate(&config, &run_dir, created)?;

            println!("Policy impact (policy - baseline), all types:");
            for (label, value) in ["share >= 12", "share >= 16", "mean schooling", "college years"]
                .iter()
                .zip(report.policy_impact.all_types())
            {
                println!("  {label:<16} {value:>10.4}");
            }
            println!(
                "Variance ratio:  baseline {:.4}  policy {:.4}",
                report.baseline_variance_ratio, report.policy_variance_ratio
            );
            println!("Results: {}", run_dir.display());
        }
        (_, None) => return Err(eyre!("no run directory for this command")),
    }

    tracing::info!("Done");
    Ok(())
}

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use stpd_bench::bench::{BenchPlan, run_benchmarks};
use stpd_bench::config::{AppConfig, ConfigSource, default_config_path};
use stpd_bench::output;
use stpd_bench::pipeline::{BuildParams, build_index};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stpd")]
#[command(about = "Build STPD indexes and benchmark their locate queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the per-user config, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the BWT and suffix array of a text via prefix-free parsing.
    /// The input cannot contain the bytes 0, 1 or 2, which PFP uses internally.
    Build {
        /// Input file name
        input: PathBuf,

        /// Output files basepath (default: input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// PFP: sliding window size
        #[arg(short = 'w', long = "wsize", default_value_t = 10)]
        window: u32,

        /// PFP: hash modulus
        #[arg(short = 'p', long = "mod", default_value_t = 100)]
        modulus: u32,

        /// PFP: number of threads
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,
    },
    /// Run locate queries against built indexes and write CSV results
    Bench {
        /// The input file
        input: Option<PathBuf>,

        /// Test locate-all queries on the STPD index variants
        #[arg(long = "locate-stpd", alias = "locate_STPD")]
        locate_stpd: bool,

        /// Test locate queries on the competitor r-index
        #[arg(long = "locate-ri", alias = "locate_ri")]
        locate_ri: bool,

        /// Directory (under the base directory) receiving the .log, .res and .csv files
        #[arg(long = "logs-dir-name", alias = "logs_dir_name")]
        logs_dir_name: PathBuf,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the per-user config file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let progress = std::io::stderr().is_terminal();

    match cli.command {
        Commands::Build {
            input,
            output,
            window,
            modulus,
            threads,
        } => {
            let (config, _) = AppConfig::load(cli.config.as_deref())?;
            let params = BuildParams {
                output: output.unwrap_or_else(|| input.clone()),
                input,
                window,
                modulus,
                threads,
            };

            let outcome = build_index(&config, &params, progress)?;
            if let Some(stage) = outcome.failed_stage() {
                bail!("pipeline aborted: {} failed", stage.title());
            }
            if let Some(cleanup) = &outcome.cleanup {
                if !cleanup.is_clean() {
                    bail!(
                        "cleanup failed for {} of {} removal commands",
                        cleanup.failures.len(),
                        cleanup.issued
                    );
                }
            }
        }
        Commands::Bench {
            input,
            locate_stpd,
            locate_ri,
            logs_dir_name,
        } => {
            let Some(input) = input else {
                bail!("an input file is required");
            };
            let (config, _) = AppConfig::load(cli.config.as_deref())?;

            if !locate_stpd && !locate_ri {
                output::print_warning("neither --locate-stpd nor --locate-ri given, no queries will run");
            }

            let plan = BenchPlan {
                input,
                locate_stpd,
                locate_ri,
            };
            let (outputs, summary) = run_benchmarks(&config, &plan, &logs_dir_name, progress)?;

            println!("Results written to: {}", outputs.csv.display());
            println!("Rows: {}, skipped combinations: {}", summary.rows, summary.skipped.len());
            for skipped in &summary.skipped {
                println!(
                    "  {} (pattern length {}): {}",
                    skipped.label, skipped.pattern_length, skipped.error
                );
            }
        }
        Commands::Config { init } => {
            if init {
                let path = default_config_path().context("Could not determine config directory")?;
                if path.exists() {
                    bail!("config file already exists: {}", path.display());
                }
                AppConfig::default().save(&path)?;
                println!("Wrote default configuration to {}", path.display());
                return Ok(());
            }

            let (config, source) = AppConfig::load(cli.config.as_deref())?;
            match source {
                ConfigSource::Explicit(path) | ConfigSource::UserFile(path) => {
                    println!("Configuration from: {}", path.display())
                }
                ConfigSource::Defaults => println!("Configuration: built-in defaults"),
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

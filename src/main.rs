// ReconLog - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation
// 3. Registry loading (built-in + user-defined)
// 4. Dispatch to one pipeline stage and exit-code mapping

use clap::{Parser, Subcommand};
use reconlog::app::pipeline::{self, DirectorySeriesSink, ExtractRequest};
use reconlog::app::registry_mgr;
use reconlog::core::export::ColumnMode;
use reconlog::core::registry::CompileOptions;
use reconlog::platform::config::{self, AppConfig, PlatformPaths};
use reconlog::util::{self, constants};
use reconlog::util::error::ReconLogError;
use std::path::PathBuf;
use std::process::ExitCode;

/// ReconLog - SVR reconstruction log post-processor.
///
/// Turns reconstruction and segmentation logs into per-run metric tables and
/// merges per-run results into comparison tables.
#[derive(Parser, Debug)]
#[command(name = "reconlog", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Directory of user-defined field registries.
    #[arg(short = 'r', long = "registry-dir", global = true)]
    registry_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a reconstruction log into a summary text and an SVR metrics table.
    ExtractSummary {
        /// Reconstruction pipeline log (e.g. a slurm .out file).
        #[arg(long)]
        log: PathBuf,

        /// Summary text output.
        #[arg(long)]
        summary: PathBuf,

        /// SVR metrics CSV output.
        #[arg(long)]
        table: PathBuf,

        /// calc-volumes text file from the segmentation step.
        #[arg(long, requires = "volumes_table")]
        volumes: Option<PathBuf>,

        /// Volumes CSV output.
        #[arg(long, requires = "volumes")]
        volumes_table: Option<PathBuf>,
    },

    /// Merge per-run "measure value" files into one wide comparison table.
    CombineVolumes {
        /// Number of input files that follow.
        count: usize,

        /// Input files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output CSV.
        #[arg(short, long, default_value = constants::DEFAULT_COMBINED_VOLUMES_FILE)]
        output: PathBuf,
    },

    /// Write one row per "measure value" file into a combined table.
    CombineResults {
        /// Output CSV.
        output: PathBuf,

        /// Input files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Use every label found in any file as a column, not just the first
        /// file's labels.
        #[arg(long)]
        union: bool,
    },

    /// Export one series document per measure of a comparison table for the
    /// charting step.
    Series {
        /// Comparison table produced by combine-volumes.
        #[arg(short, long, default_value = constants::DEFAULT_COMBINED_VOLUMES_FILE)]
        input: PathBuf,

        /// Output directory for the series documents.
        #[arg(short = 'o', long, default_value = constants::DEFAULT_SERIES_DIR)]
        out_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let platform_paths = PlatformPaths::resolve();

    // Config is read before logging exists; its warnings are logged after init.
    let (app_config, config_warnings) = match &cli.config {
        Some(path) => match config::load_config(path, true) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {}", ReconLogError::from(e));
                return ExitCode::from(constants::EXIT_FAILURE);
            }
        },
        None => config::load_config(&platform_paths.config_file(), false)
            .unwrap_or_else(|_| (AppConfig::default(), Vec::new())),
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::debug!(
        version = constants::APP_VERSION,
        union_columns = app_config.union_columns,
        "ReconLog starting"
    );

    match run(cli, &app_config, &platform_paths) {
        Ok(code) => ExitCode::from(code),
        Err(ReconLogError::Usage(e)) => {
            tracing::error!(error = %e, "Invalid arguments");
            eprintln!("Error: {e}");
            ExitCode::from(constants::EXIT_USAGE)
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("Error: {e}");
            ExitCode::from(constants::EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli, app_config: &AppConfig, platform_paths: &PlatformPaths) -> Result<u8, ReconLogError> {
    match cli.command {
        Command::ExtractSummary {
            log,
            summary,
            table,
            volumes,
            volumes_table,
        } => {
            // CLI override > config > platform default
            let registry_dir = cli
                .registry_dir
                .or_else(|| app_config.registry_dir.clone())
                .unwrap_or_else(|| platform_paths.user_registries_dir.clone());
            let options = CompileOptions {
                word_boundary: app_config.word_boundary,
            };
            let (registries, registry_errors) =
                registry_mgr::load_all_registries(Some(&registry_dir), options);
            for err in &registry_errors {
                tracing::warn!(error = %err, "Registry loading warning");
            }
            tracing::info!(
                registries = registries.all().len(),
                keyword_matching = if options.word_boundary {
                    "word"
                } else {
                    "substring"
                },
                "Field registries loaded"
            );

            let request = ExtractRequest {
                log,
                summary_out: summary,
                table_out: table,
                volumes: volumes.zip(volumes_table),
            };
            pipeline::extract_summary(&request, registries.svr_metrics()?, registries.volumes()?)?;

            println!("Summary written to {}", request.summary_out.display());
            println!("CSV summary written to {}", request.table_out.display());
            if let Some((_, volumes_out)) = &request.volumes {
                println!("Results printed to {}", volumes_out.display());
            }
            Ok(constants::EXIT_SUCCESS)
        }

        Command::CombineVolumes {
            count,
            files,
            output,
        } => {
            let declared = pipeline::select_declared(count, &files)?;
            let (_, outcome) = pipeline::combine_volumes(declared, &output)?;
            println!("Data written to {}", output.display());
            Ok(outcome.exit_code())
        }

        Command::CombineResults {
            output,
            files,
            union,
        } => {
            let mode = if union || app_config.union_columns {
                ColumnMode::Union
            } else {
                ColumnMode::FirstSource
            };
            let outcome = pipeline::combine_results(&files, &output, mode)?;
            println!("Data written to {}", output.display());
            Ok(outcome.exit_code())
        }

        Command::Series { input, out_dir } => {
            let mut sink = DirectorySeriesSink::new(&out_dir);
            pipeline::export_series(&input, &mut sink)?;
            println!(
                "{} series written to directory: {}",
                sink.written().len(),
                out_dir.display()
            );
            Ok(constants::EXIT_SUCCESS)
        }
    }
}

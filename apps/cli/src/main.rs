//! Anneal CLI - command-line interface for the anneal training pipeline
//!
//! This CLI provides an `anneal` command for preparing object-detection
//! datasets and training model versions incrementally against an external
//! YOLO-style trainer.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Anneal - versioned incremental training for detection datasets
///
/// Anneal fingerprints every exported dataset, decides between skipping,
/// incremental training, and a full retrain based on how much the dataset
/// changed, and keeps the complete version lineage on disk.
#[derive(Parser, Debug)]
#[command(
    name = "anneal",
    author,
    version,
    about = "Anneal - versioned incremental training for detection datasets"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Pipeline config file
    #[arg(short, long, default_value = "configs/pipeline.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scaffold the pipeline directory layout and default config
    ///
    /// Creates the videos/frames/annotations/data/models directories and
    /// writes a commented configs/pipeline.yaml ready to edit.
    Init {
        /// Target path (optional, defaults to current directory)
        path: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Extract frames from videos that have none yet
    ///
    /// Runs the configured extractor command once per new video with a
    /// bounded worker pool. Videos whose frames already exist are skipped.
    Extract {
        /// Override the configured worker count
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Split the exported annotations into train/val sets
    ///
    /// Pairs label files with their images, shuffles with a fixed seed,
    /// rebuilds the dataset's train/val directories, and writes the YOLO
    /// data config.
    Split {
        /// Exported annotation directory (defaults to the configured path)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Fraction of pairs assigned to training
        #[arg(long)]
        train_ratio: Option<f64>,

        /// Fraction of pairs assigned to validation
        #[arg(long)]
        val_ratio: Option<f64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Audit the exported annotations against the class list
    ///
    /// Strict per-line label checks plus quality warnings (tiny boxes,
    /// edge-hugging boxes, class imbalance). Exits non-zero when errors
    /// are found.
    Validate {
        /// Exported annotation directory (defaults to the configured path)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Thin out image/label pairs whose label file is empty
    ///
    /// Keeps a percentage of empty-label pairs as negative examples and
    /// deletes the rest, chosen by a seeded shuffle. Asks for confirmation
    /// unless --yes is given.
    Sanitize {
        /// Percentage of empty-label pairs to keep
        #[arg(default_value_t = 10.0)]
        keep_percent: f64,

        /// Exported annotation directory (defaults to the configured path)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Shuffle seed (defaults to the configured split seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Show the plan without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Train a new model version if the dataset changed
    ///
    /// Fingerprints the dataset, selects new/incremental/retrain against the
    /// version history, runs the external trainer, and records the version.
    /// An unchanged dataset is skipped. Prints a comparison against the
    /// previous version when one exists.
    Train {
        /// Override the configured dataset directory
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Print the recorded version as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare metrics between two versions
    Compare {
        /// Baseline version id (defaults to the second most recent)
        baseline: Option<String>,

        /// Candidate version id (defaults to the most recent)
        candidate: Option<String>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a version's checkpoint to a deployment format
    Export {
        /// Target format (onnx, torchscript, coreml, tflite)
        #[arg(long, default_value = "onnx")]
        format: String,

        /// Version to export (defaults to the latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// List all trained versions
    Versions {
        /// Print the version records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show pipeline progress derived from the filesystem
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the pipeline stages in order
    ///
    /// Without flags: extract frames, run the upload and import stages, then
    /// stop for labeling. With --resume-after-labeling: run the annotation
    /// export stage, split the dataset, and train.
    Pipeline {
        /// Continue from the annotation-export stage
        #[arg(long)]
        resume_after_labeling: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Init { path, force } => {
            commands::init::execute(path, force).await?;
        }
        Command::Extract { workers } => {
            commands::extract::execute(&args.config, workers).await?;
        }
        Command::Split { export_dir, train_ratio, val_ratio, seed } => {
            commands::split::execute(&args.config, export_dir, train_ratio, val_ratio, seed)
                .await?;
        }
        Command::Validate { export_dir, json } => {
            commands::validate::execute(&args.config, export_dir, json).await?;
        }
        Command::Sanitize { keep_percent, export_dir, seed, dry_run, yes } => {
            commands::sanitize::execute(&args.config, keep_percent, export_dir, seed, dry_run, yes)
                .await?;
        }
        Command::Train { dataset, json } => {
            commands::train::execute(&args.config, dataset, json).await?;
        }
        Command::Compare { baseline, candidate, json } => {
            commands::compare::execute(&args.config, baseline, candidate, json).await?;
        }
        Command::Export { format, version } => {
            commands::export::execute(&args.config, &format, version).await?;
        }
        Command::Versions { json } => {
            commands::versions::execute(&args.config, json).await?;
        }
        Command::Status { json } => {
            commands::status::execute(&args.config, json).await?;
        }
        Command::Pipeline { resume_after_labeling } => {
            commands::pipeline::execute(&args.config, resume_after_labeling).await?;
        }
    }

    Ok(())
}

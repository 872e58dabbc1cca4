//! formcheck CLI
//!
//! Command-line driver for baseline collection and pose comparison. Inputs
//! are detection records: one JSON document per image, as produced by the
//! landmark detection service.
//!
//! # Usage
//!
//! ```bash
//! # Build a baseline from a folder of reference detections
//! formcheck collect --input refs/ --output baseline.json --method median
//!
//! # Score one detection
//! formcheck compare --baseline baseline.json --sample live.json
//!
//! # Score a folder and write a summary
//! formcheck validate --baseline baseline.json --samples tests/ --output results.json
//!
//! # Inspect a baseline
//! formcheck show --baseline baseline.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use formcheck_compare::ThresholdUpdate;
use formcheck_core::AggregateMethod;

pub mod commands;
pub mod records;
pub mod report;

/// formcheck Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(author, version, about = "Pose baseline collection and form scoring")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a baseline from a folder of detection records
    Collect(CollectArgs),

    /// Compare one detection record against a baseline
    Compare(CompareArgs),

    /// Compare every record in a folder and summarize
    Validate(ValidateArgs),

    /// Print baseline metadata and angle statistics
    Show(ShowArgs),
}

/// Arguments for the collect command
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Folder of detection records (*.json)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Baseline file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// How reference samples are combined
    #[arg(short, long, value_enum, default_value = "average")]
    pub method: MethodArg,
}

/// Aggregation method argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MethodArg {
    Average,
    Median,
    First,
    All,
}

impl From<MethodArg> for AggregateMethod {
    fn from(val: MethodArg) -> Self {
        match val {
            MethodArg::Average => AggregateMethod::Average,
            MethodArg::Median => AggregateMethod::Median,
            MethodArg::First => AggregateMethod::First,
            MethodArg::All => AggregateMethod::All,
        }
    }
}

/// Threshold overrides shared by compare and validate
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct ThresholdArgs {
    /// Maximum joint displacement (normalized units)
    #[arg(short, long)]
    pub position_threshold: Option<f64>,

    /// Maximum angle difference in degrees
    #[arg(short, long)]
    pub angle_threshold: Option<f64>,

    /// Overall accuracy required to pass (percent)
    #[arg(long)]
    pub accuracy_threshold: Option<f64>,
}

impl From<ThresholdArgs> for ThresholdUpdate {
    fn from(args: ThresholdArgs) -> Self {
        ThresholdUpdate {
            position_threshold: args.position_threshold,
            angle_threshold: args.angle_threshold,
            accuracy_threshold: args.accuracy_threshold,
        }
    }
}

/// Arguments for the compare command
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline file
    #[arg(short, long)]
    pub baseline: PathBuf,

    /// Detection record to score
    #[arg(short, long)]
    pub sample: PathBuf,

    /// Threshold configuration file (JSON); absent fields keep the default thresholds
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Print the full result instead of the flag record
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Baseline file
    #[arg(short, long)]
    pub baseline: PathBuf,

    /// Folder of detection records (*.json)
    #[arg(short, long)]
    pub samples: PathBuf,

    /// Threshold configuration file (JSON); absent fields keep the lenient thresholds
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Where to write the JSON summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Baseline file
    #[arg(short, long)]
    pub baseline: PathBuf,
}

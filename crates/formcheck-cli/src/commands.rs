//! Command execution

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::Colorize;
use formcheck_baseline::{load_baseline, save_baseline, scoring_stats, BaselineCollector};
use formcheck_compare::{ComparisonConfig, ComparisonContext, ComparisonFlag, ComparisonResult, ThresholdUpdate};
use formcheck_core::{AngleStats, Arm, Baseline};
use serde::Serialize;

use crate::records::{list_records, read_detection, record_name};
use crate::report::{ValidationEntry, ValidationReport};
use crate::{CollectArgs, CompareArgs, Commands, ShowArgs, ThresholdArgs, ValidateArgs};

/// Corrections printed per record in a validation run
const SHOWN_CORRECTIONS: usize = 3;

/// Execute a top-level command
pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Collect(args) => execute_collect(args),
        Commands::Compare(args) => execute_compare(args),
        Commands::Validate(args) => execute_validate(args),
        Commands::Show(args) => execute_show(args),
    }
}

/// Preset, then an optional config file, then command-line overrides
fn resolve_config(path: Option<&Path>, preset: ComparisonConfig, overrides: ThresholdArgs) -> Result<ComparisonConfig> {
    let base = match path {
        Some(path) => ThresholdUpdate::from_file(path)
            .and_then(|file| file.apply(preset))
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => preset,
    };
    ThresholdUpdate::from(overrides)
        .apply(base)
        .context("Invalid threshold override")
}

fn execute_collect(args: CollectArgs) -> Result<()> {
    let records = list_records(&args.input)?;
    if records.is_empty() {
        bail!("No detection records found in {}", args.input.display());
    }

    println!("{}", "Baseline Collection".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Source:".dimmed(), args.input.display());
    println!("  {} {}", "Records:".dimmed(), records.len());
    println!();

    let mut collector = BaselineCollector::new(args.method.into()).with_source_folder(args.input.display().to_string());
    for path in &records {
        let name = record_name(path);
        match read_detection(path) {
            Ok(detection) => {
                collector.add(name, &detection);
            }
            Err(e) => tracing::warn!(record = %name, error = %e, "Unreadable detection record"),
        }
    }

    let (baseline, report) = collector.finish().context("Failed to build baseline")?;
    save_baseline(&baseline, &args.output)
        .with_context(|| format!("Failed to write baseline {}", args.output.display()))?;

    println!(
        "{} Baseline built from {} of {} records ({})",
        "✓".green(),
        report.processed.len().to_string().bold(),
        records.len(),
        baseline.method()
    );
    for skipped in &report.skipped {
        println!("  {} {}: {}", "skipped".yellow(), skipped.name, skipped.reason);
    }
    println!("  {} {}", "Output:".dimmed(), args.output.display());
    println!();

    print_angles(&baseline)
}

#[derive(Serialize)]
struct DetailedOutput<'a> {
    flag: &'a ComparisonFlag,
    detailed_result: &'a ComparisonResult,
}

fn execute_compare(args: CompareArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), ComparisonConfig::default(), args.thresholds)?;
    let context = ComparisonContext::new(config)?;
    context
        .load_baseline(&args.baseline)
        .with_context(|| format!("Failed to load baseline {}", args.baseline.display()))?;

    let detection = read_detection(&args.sample)?;
    let result = context.compare(&detection)?;
    let flag = result.flag();

    let output = if args.detailed {
        serde_json::to_string_pretty(&DetailedOutput {
            flag: &flag,
            detailed_result: &result,
        })?
    } else {
        serde_json::to_string_pretty(&flag)?
    };
    println!("{output}");
    Ok(())
}

fn execute_validate(args: ValidateArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref(), ComparisonConfig::lenient(), args.thresholds)?;
    let context = ComparisonContext::new(config)?;
    let baseline = context
        .load_baseline(&args.baseline)
        .with_context(|| format!("Failed to load baseline {}", args.baseline.display()))?;

    let records = list_records(&args.samples)?;
    if records.is_empty() {
        bail!("No detection records found in {}", args.samples.display());
    }

    println!("{}", "Pose Validation".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {} position {:.2}, angle {:.1}°, accuracy {:.1}%",
        "Thresholds:".dimmed(),
        config.position_threshold,
        config.angle_threshold,
        config.accuracy_threshold
    );
    println!("  {} {}", "Records:".dimmed(), records.len());
    println!();

    let total = records.len();
    let mut results = Vec::with_capacity(total);
    for (i, path) in records.iter().enumerate() {
        let name = record_name(path);
        let scored = read_detection(path).and_then(|detection| Ok(context.compare(&detection)?));
        let entry = match scored {
            Ok(result) => ValidationEntry::from_flag(&name, result.flag()),
            Err(e) => {
                tracing::warn!(record = %name, error = %e, "Record could not be scored");
                ValidationEntry::unreadable(&name, format!("Could not score record: {e:#}"))
            }
        };

        let status = if entry.is_accurate {
            "PASS".green().bold()
        } else {
            "NEEDS CORRECTION".red().bold()
        };
        println!(
            "[{}/{}] {} {:.1}% {} {}",
            i + 1,
            total,
            name,
            entry.accuracy,
            entry.level.to_string().to_uppercase(),
            status
        );
        for correction in entry.corrections.iter().take(SHOWN_CORRECTIONS) {
            println!("    - {} {}: {}", correction.arm, correction.joint, correction.message);
        }

        results.push(entry);
    }

    let report = ValidationReport::new(
        Local::now().naive_local(),
        baseline.baseline().metadata.processed_files.clone(),
        results,
    );
    let summary = report.summary;

    println!();
    println!("{}", "Validation Summary".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  Total tested: {}", summary.total_tested);
    println!(
        "  Passed: {} ({:.1}%)",
        summary.passed.to_string().green(),
        summary.percent(summary.passed)
    );
    println!(
        "  Failed: {} ({:.1}%)",
        summary.failed.to_string().red(),
        summary.percent(summary.failed)
    );
    println!("  Average accuracy: {:.1}%", summary.average_accuracy);
    println!();
    println!("{}", report.table());

    if let Some(output) = &args.output {
        write_json(output, &report).with_context(|| format!("Failed to write {}", output.display()))?;
        println!();
        println!("{} Results saved to {}", "✓".green(), output.display());
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<()> {
    let baseline = load_baseline(&args.baseline)
        .with_context(|| format!("Failed to load baseline {}", args.baseline.display()))?;
    let metadata = &baseline.metadata;

    println!("{}", "Baseline".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Created:".dimmed(), metadata.created_at);
    println!("  {} {}", "Source:".dimmed(), metadata.source_folder);
    println!("  {} {}", "Method:".dimmed(), metadata.aggregate_method);
    println!("  {} {}", "Images:".dimmed(), metadata.num_images_processed);
    for file in &metadata.processed_files {
        println!("    - {file}");
    }
    println!();

    print_angles(&baseline)
}

fn print_angles(baseline: &Baseline) -> Result<()> {
    let (landmarks, angles) = scoring_stats(baseline)?;

    println!(
        "{} ({} joints)",
        "Baseline Angles".bold(),
        landmarks.joint_count()
    );
    for line in angle_lines(&angles) {
        println!("{line}");
    }
    Ok(())
}

/// One line per arm header and per present angle
fn angle_lines(angles: &AngleStats) -> Vec<String> {
    let mut lines = Vec::new();
    for &arm in Arm::all() {
        lines.push(format!("  {arm}:"));
        let arm_angles = angles.get(arm);
        if arm_angles.is_empty() {
            lines.push("    (none)".to_string());
        }
        for (kind, stat) in arm_angles.iter() {
            lines.push(format!("    {kind}: {:.1}° (±{:.1}°)", stat.value, stat.std));
        }
    }
    lines
}

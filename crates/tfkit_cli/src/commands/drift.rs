//! Drift commands - Version drift and plan risk reports.
//!
//! Reports go to stdout; progress and warnings go to the log on stderr.
//! Each command returns the process exit code for its findings.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{error, info, warn};

use tfkit_core::{Config, ConfigOverrides};
use tfkit_drift::{
    parse_plan_file, CombinedAnalysis, DriftAnalyzer, DriftReport, PlanAnalysis, PlanAnalyzer,
    ReportFormatter, VersionDetector,
};

use super::OutputArgs;

#[derive(Args)]
pub struct VersionArgs {
    /// Directory to scan for Terraform files
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Plan file produced by `terraform show -json`
    #[arg(long)]
    pub plan_file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct AllArgs {
    /// Directory to scan for Terraform files
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Plan file produced by `terraform show -json`
    #[arg(long)]
    pub plan_file: Option<PathBuf>,

    /// Skip plan analysis
    #[arg(long)]
    pub skip_plan: bool,

    /// Skip version analysis
    #[arg(long)]
    pub skip_versions: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_version(args: VersionArgs, config_path: Option<&Path>) -> Result<i32> {
    let path = super::resolve_scan_path(&args.path)?;
    let config = super::load_config(config_path, &ConfigOverrides::default())?;

    let Some(report) = analyze_versions(&path, &config)? else {
        warn!("No Terraform files with version declarations found in {}", path.display());
        return Ok(0);
    };

    write_report(&args.output, &config, |formatter, w| {
        formatter.format_drift(&report, args.output.format, w)
    })?;

    log_drift_outcome(&report);
    Ok(report.exit_code())
}

pub fn execute_plan(args: PlanArgs, config_path: Option<&Path>) -> Result<i32> {
    let plan_file = super::expand_home(&args.plan_file);
    if !plan_file.is_file() {
        anyhow::bail!(
            "Plan file not found: {}\nGenerate one with: terraform plan -out=plan.tfplan && terraform show -json plan.tfplan > plan.json",
            plan_file.display()
        );
    }
    let config = super::load_config(config_path, &ConfigOverrides::default())?;

    let analysis = analyze_plan(&plan_file, &config)?;

    write_report(&args.output, &config, |formatter, w| {
        formatter.format_plan(&analysis, args.output.format, w)
    })?;

    log_plan_outcome(&analysis);
    Ok(analysis.exit_code())
}

pub fn execute_all(args: AllArgs, config_path: Option<&Path>) -> Result<i32> {
    if args.skip_versions && args.skip_plan {
        anyhow::bail!("Nothing to analyze: both --skip-versions and --skip-plan were given");
    }

    let mut skip_plan = args.skip_plan;
    if args.plan_file.is_none() && !skip_plan {
        warn!("No --plan-file given, skipping plan analysis");
        skip_plan = true;
    }
    if args.skip_versions && skip_plan {
        anyhow::bail!("Nothing to analyze: versions skipped and no plan file given");
    }

    let config = super::load_config(config_path, &ConfigOverrides::default())?;
    let mut combined = CombinedAnalysis::new();

    if !args.skip_versions {
        let outcome = super::resolve_scan_path(&args.path)
            .and_then(|path| analyze_versions(&path, &config));
        match outcome {
            Ok(Some(report)) => {
                log_drift_outcome(&report);
                combined.record_versions(&report);
            }
            Ok(None) => warn!("No Terraform files with version declarations found"),
            Err(e) => {
                error!("Version analysis failed: {:#}", e);
                combined.record_failure();
            }
        }
    }

    if let (false, Some(plan_file)) = (skip_plan, args.plan_file.as_deref()) {
        match analyze_plan(&super::expand_home(plan_file), &config) {
            Ok(analysis) => {
                log_plan_outcome(&analysis);
                combined.record_plan(analysis);
            }
            Err(e) => {
                error!("Plan analysis failed: {:#}", e);
                combined.record_failure();
            }
        }
    }

    write_report(&args.output, &config, |formatter, w| {
        formatter.format_combined(&combined, args.output.format, w)
    })?;

    info!("Overall status: {}", combined.overall_status);
    Ok(combined.exit_code())
}

/// Scan `path` and compare against the configured baseline.
///
/// `None` when no file declares any version.
fn analyze_versions(path: &Path, config: &Config) -> Result<Option<DriftReport>> {
    info!("Scanning {} for version declarations", path.display());
    let records = VersionDetector::new(path)
        .scan()
        .with_context(|| format!("Failed to scan {}", path.display()))?;
    if records.is_empty() {
        return Ok(None);
    }

    let report = DriftAnalyzer::new(config.baseline()).analyze(path, &records);
    Ok(Some(report))
}

fn analyze_plan(plan_file: &Path, config: &Config) -> Result<PlanAnalysis> {
    info!("Analyzing plan {}", plan_file.display());
    let plan = parse_plan_file(plan_file)
        .with_context(|| format!("Failed to parse plan {}", plan_file.display()))?;
    let settings = config.drift_settings();
    Ok(PlanAnalyzer::new(settings.critical_resources).analyze(&plan))
}

fn write_report<F>(output: &OutputArgs, config: &Config, render: F) -> Result<()>
where
    F: FnOnce(&ReportFormatter, &mut dyn Write) -> tfkit_drift::DriftResult<()>,
{
    let formatter = ReportFormatter::new()
        .with_color(output.use_color())
        .with_width(super::terminal_width())
        .with_top_n(config.drift_settings().top_n);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&formatter, &mut out).context("Failed to write report")?;
    out.flush().context("Failed to write report")?;
    Ok(())
}

fn log_drift_outcome(report: &DriftReport) {
    if report.summary.files_with_errors > 0 {
        warn!(
            "{} file(s) could not be parsed",
            report.summary.files_with_errors
        );
    }
    if report.has_drift() {
        warn!("{}", report.summary_text());
    } else {
        info!("{}", report.summary_text());
    }
}

fn log_plan_outcome(analysis: &PlanAnalysis) {
    if analysis.has_critical_changes() {
        warn!(
            "Plan deletes {} and replaces {} resource(s)",
            analysis.deletions, analysis.replacements
        );
    } else if analysis.has_changes {
        info!("Plan changes {} resource(s)", analysis.total_changes);
    } else {
        info!("Plan has no changes");
    }
}

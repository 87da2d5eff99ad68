//! Output formats for drift reports and plan analyses.
//!
//! Every report type renders to the same closed set of formats:
//! pretty JSON, CSV with a fixed header row, and bordered tables.

mod drift;
mod plan;
pub mod style;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::combined::{CombinedAnalysis, OverallStatus};
use crate::error::{DriftError, DriftResult};
use crate::plan::PlanAnalysis;
use crate::types::DriftReport;

pub use plan::by_severity;
use style::{Palette, Tone};

/// Default terminal width for tables.
pub const DEFAULT_WIDTH: u16 = 120;

/// Default number of rows shown in ranked group tables.
pub const DEFAULT_TOP_N: usize = 10;

const SEPARATOR_WIDTH: usize = 70;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// True for formats meant to be consumed by other programs.
    pub fn is_machine_readable(&self) -> bool {
        !matches!(self, OutputFormat::Table)
    }
}

impl FromStr for OutputFormat {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(DriftError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders reports to a writer in a chosen format.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    use_color: bool,
    width: u16,
    top_n: usize,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter {
    /// Plain output at the default width.
    pub fn new() -> Self {
        Self {
            use_color: false,
            width: DEFAULT_WIDTH,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Limit ranked group tables to `top_n` rows. Zero shows everything.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn format_drift(
        &self,
        report: &DriftReport,
        format: OutputFormat,
        w: &mut dyn Write,
    ) -> DriftResult<()> {
        match format {
            OutputFormat::Json => drift::write_json(report, w),
            OutputFormat::Csv => drift::write_csv(report, w),
            OutputFormat::Table => drift::write_table(report, &self.palette(), w),
        }
    }

    pub fn format_plan(
        &self,
        analysis: &PlanAnalysis,
        format: OutputFormat,
        w: &mut dyn Write,
    ) -> DriftResult<()> {
        match format {
            OutputFormat::Json => plan::write_json(analysis, w),
            OutputFormat::Csv => plan::write_csv(analysis, w),
            OutputFormat::Table => plan::write_table(analysis, &self.palette(), self.top_n, w),
        }
    }

    pub fn format_combined(
        &self,
        combined: &CombinedAnalysis,
        format: OutputFormat,
        w: &mut dyn Write,
    ) -> DriftResult<()> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(combined)?;
                writeln!(w, "{}", json)?;
                Ok(())
            }
            OutputFormat::Csv => write_combined_csv(combined, w),
            OutputFormat::Table => write_combined_table(combined, &self.palette(), w),
        }
    }

    fn palette(&self) -> Palette {
        Palette::new(self.use_color, self.width)
    }
}

fn write_combined_csv(combined: &CombinedAnalysis, w: &mut dyn Write) -> DriftResult<()> {
    let mut csv = csv::Writer::from_writer(&mut *w);
    csv.write_record(["Analysis Type", "Metric", "Value"])?;

    if let Some(versions) = &combined.version_drift {
        for (metric, value) in [
            ("total_files", versions.total_files),
            ("files_with_drift", versions.files_with_drift),
            ("minor_drift", versions.minor_drift),
            ("major_drift", versions.major_drift),
            ("files_with_errors", versions.files_with_errors),
        ] {
            let value = value.to_string();
            csv.write_record(["version_drift", metric, value.as_str()])?;
        }
    }

    if let Some(plan) = &combined.plan_analysis {
        for (metric, value) in [
            ("total_changes", plan.total_changes),
            ("additions", plan.additions),
            ("modifications", plan.modifications),
            ("deletions", plan.deletions),
            ("replacements", plan.replacements),
        ] {
            let value = value.to_string();
            csv.write_record(["plan_analysis", metric, value.as_str()])?;
        }
    }

    csv.write_record(["overall", "status", combined.overall_status.as_str()])?;
    csv.flush()?;
    Ok(())
}

fn write_combined_table(
    combined: &CombinedAnalysis,
    palette: &Palette,
    w: &mut dyn Write,
) -> DriftResult<()> {
    let heavy = "=".repeat(SEPARATOR_WIDTH);
    let light = "─".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", heavy));
    out.push_str(&palette.title("                 COMBINED DRIFT ANALYSIS RESULTS"));
    out.push_str(&format!("\n{}\n", heavy));

    if let Some(versions) = &combined.version_drift {
        out.push_str(&format!(
            "\n{}\n",
            palette.heading("─── Version Drift Analysis ───")
        ));
        out.push_str(&metric_line("Total Files Scanned:", versions.total_files));
        out.push_str(&metric_line("Files with Drift:", versions.files_with_drift));
        out.push_str(&metric_line("Minor Drift:", versions.minor_drift));
        out.push_str(&metric_line("Major Drift:", versions.major_drift));
        if versions.files_with_errors > 0 {
            out.push_str(&metric_line("Files with Errors:", versions.files_with_errors));
        }
        let status = match (versions.has_drift, versions.major_drift > 0) {
            (false, _) => palette.tone(Tone::Good, "✔ Clean"),
            (true, true) => palette.tone(Tone::Bad, "✘ Drift Detected"),
            (true, false) => palette.tone(Tone::Warn, "✘ Drift Detected"),
        };
        out.push_str(&format!("  {:<24}{}\n", "Status:", status));
    }

    if let Some(plan) = &combined.plan_analysis {
        out.push_str(&format!("\n{}\n", palette.heading("─── Plan Analysis ───")));
        out.push_str(&metric_line("Total Changes:", plan.total_changes));
        out.push_str(&metric_line("Additions:", plan.additions));
        out.push_str(&metric_line("Modifications:", plan.modifications));
        out.push_str(&metric_line("Deletions:", plan.deletions));
        out.push_str(&metric_line("Replacements:", plan.replacements));
        let status = match (plan.has_changes, plan.has_critical_changes()) {
            (false, _) => palette.tone(Tone::Good, "✔ No Changes"),
            (true, true) => palette.tone(Tone::Bad, "✘ Changes Detected"),
            (true, false) => palette.tone(Tone::Warn, "✘ Changes Detected"),
        };
        out.push_str(&format!("  {:<24}{}\n", "Status:", status));
    }

    let tone = match combined.overall_status {
        OverallStatus::Clean => Tone::Good,
        OverallStatus::Warning => Tone::Warn,
        OverallStatus::Critical => Tone::Bad,
    };
    out.push_str(&format!("\n{}\n", light));
    out.push_str(&format!(
        "  {:<24}{}\n",
        "Overall Status:",
        palette.tone(tone, &combined.overall_status.as_str().to_uppercase())
    ));
    out.push_str(&format!("{}\n\n", heavy));

    w.write_all(out.as_bytes())?;
    Ok(())
}

fn metric_line(label: &str, value: usize) -> String {
    format!("  {:<24}{}\n", label, value)
}
